//! Unit tests for error handling.
//!
//! This module contains tests for error kinds, severities and diagnostic rendering.

use crate::errors::diagnostics::{Diagnostic, Severity};
use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::SourceLocation;
use std::rc::Rc;

fn location(line: u32, column: u32, length: u32) -> SourceLocation {
    SourceLocation::new(line, column, length, Rc::new("test.zen".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "#".to_string(),
        },
        location(1, 10, 1),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.to_string(), "unrecognised token: \"#\"");
}

#[test]
fn test_error_location() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        location(4, 42, 3),
    );

    assert_eq!(error.get_location().line, 4);
    assert_eq!(error.get_location().column, 42);
}

#[test]
fn test_unexpected_token_tip() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        location(1, 1, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
    assert!(error.get_tip().to_string().contains("semicolon"));
}

#[test]
fn test_error_without_tip() {
    let error = Error::new(ErrorImpl::ThisOutsideObject, location(1, 1, 4));

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}

#[test]
fn test_severities() {
    let error = Error::new(
        ErrorImpl::UndeclaredIdentifier {
            name: "x".to_string(),
        },
        location(1, 1, 1),
    );
    assert_eq!(error.get_severity(), Severity::Error);

    let warning = Error::new(
        ErrorImpl::ImportNotResolved {
            path: "std.io".to_string(),
        },
        location(1, 1, 6),
    );
    assert_eq!(warning.get_severity(), Severity::Warning);
    assert!(!Diagnostic::from(warning).is_error());

    let internal = Error::new(ErrorImpl::ScopeUnderflow, location(0, 0, 0));
    let diagnostic = Diagnostic::from(internal);
    assert_eq!(diagnostic.severity, Severity::InternalError);
    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.severity.to_string(), "internal error");
}

#[test]
fn test_type_mismatch_message() {
    let error = Error::new(
        ErrorImpl::AssignmentTypeMismatch {
            target: "int".to_string(),
            value: "string".to_string(),
        },
        location(2, 1, 10),
    );

    assert_eq!(error.get_error_name(), "AssignmentTypeMismatch");
    assert!(error.to_string().starts_with("type mismatch in assignment"));
}

#[test]
fn test_braces_message_escapes() {
    let error = Error::new(
        ErrorImpl::BracesRequired {
            construct: "if".to_string(),
        },
        location(1, 1, 2),
    );
    assert_eq!(
        error.to_string(),
        "expected '{' after 'if' (braces are required)"
    );

    let error = Error::new(ErrorImpl::UnclosedBlock { opened_line: 3 }, location(7, 1, 3));
    assert_eq!(
        error.to_string(),
        "expected '}' to close the block opened on line 3"
    );
}

#[test]
fn test_render_diagnostic() {
    let source = "int a;\na = \"text\";\n";
    let diagnostic = Diagnostic::from(Error::new(
        ErrorImpl::AssignmentTypeMismatch {
            target: "int".to_string(),
            value: "string".to_string(),
        },
        location(2, 1, 10),
    ));

    let rendered = diagnostic.render(source);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines[0],
        "test.zen:2:1: error: type mismatch in assignment: cannot assign 'string' to 'int'"
    );
    assert_eq!(lines[1], "  2 | a = \"text\";");
    assert_eq!(lines[2], "    | ^~~~~~~~~");
}

#[test]
fn test_render_offset_caret() {
    let source = "let x = #;";
    let diagnostic = Diagnostic::from(Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "#".to_string(),
        },
        location(1, 9, 1),
    ));

    let rendered = diagnostic.render(source);
    assert_eq!(rendered.lines().nth(2), Some("    |         ^"));
}

#[test]
fn test_render_without_source_line() {
    let diagnostic = Diagnostic::from(Error::new(ErrorImpl::ScopeUnderflow, location(0, 0, 0)));

    assert_eq!(
        diagnostic.render(""),
        "test.zen:0:0: internal error: exiting non-existent scope"
    );
}

#[test]
fn test_cycle_messages() {
    let union = Error::new(
        ErrorImpl::RecursiveUnion {
            union: "U".to_string(),
        },
        location(1, 1, 5),
    );
    let object = Error::new(
        ErrorImpl::InheritanceCycle {
            name: "A".to_string(),
        },
        location(2, 1, 5),
    );

    assert_eq!(union.to_string(), "union 'U' contains itself");
    assert_eq!(object.to_string(), "'A' inherits from itself");
    assert_eq!(object.get_error_name(), "InheritanceCycle");
}
