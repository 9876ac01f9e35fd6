//! Semantic analysis over a parsed program.
//!
//! The analyzer walks the AST once, maintaining a scoped symbol table and
//! checking every declaration, statement and expression against the type
//! rules in [`compatibility`]. Problems are collected as diagnostics rather
//! than aborting the walk.

pub mod analyzer;
pub mod compatibility;
pub mod symbol_table;

#[cfg(test)]
mod tests;
