//! Error types and diagnostics for the front end.
//!
//! This module defines the faults raised while checking a source file.
//! It includes:
//!
//! - Error structures carrying the source location of the fault
//! - Specific error variants for lexing, parsing and analysis
//! - Severities, including a distinct internal-error severity
//! - Diagnostic rendering with the offending source line underlined

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
