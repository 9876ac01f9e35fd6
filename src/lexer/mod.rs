//! Lexical analysis module for the front end.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, builtin type names, identifiers, literals and operators
//! - Template strings with `${...}` interpolation
//! - Line and column tracking for diagnostics
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;
