//! Utility macros for the front end.
//!
//! This module defines helper macros used by the lexer:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for simple tokens
//!
//! These macros reduce boilerplate in the lexer pattern table.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$location` - The source location of the lexeme
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), location);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $location:expr) => {
        Token {
            kind: $kind,
            value: $value,
            location: $location,
        }
    };
}

/// Creates a default lexer handler for fixed-text tokens.
///
/// Generates a handler that pushes a token with the given kind and advances
/// the lexer past the token's text.
///
/// # Arguments
///
/// * `$kind` - The TokenKind to create
/// * `$value` - The literal text of the token
///
/// # Example
///
/// ```ignore
/// pattern("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let location = lexer.location($value.chars().count());
            lexer.push(MK_TOKEN!($kind, String::from($value), location));
            lexer.advance_n($value.len());
            Ok(())
        }
    };
}
