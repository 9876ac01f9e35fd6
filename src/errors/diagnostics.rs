//! Diagnostics collected while checking a file, and their textual rendering.

use std::fmt::Display;

use crate::{get_source_line, SourceLocation};

use super::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    /// A broken analyzer contract rather than a fault in the checked program.
    InternalError,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::InternalError => write!(f, "internal error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub error: Error,
    pub severity: Severity,
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        let severity = error.get_severity();
        Diagnostic { error, severity }
    }
}

impl Diagnostic {
    pub fn location(&self) -> &SourceLocation {
        self.error.get_location()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::InternalError)
    }

    /// Renders the diagnostic in the `file:line:column: severity: message`
    /// form, followed by the source line and an underline.
    ///
    /// ```text
    /// main.zen:2:5: error: type mismatch in assignment: cannot assign 'string' to 'int'
    ///   2 | a = "text";
    ///     | ^~~~~~~~~~
    /// ```
    pub fn render(&self, source: &str) -> String {
        let location = self.location();
        let mut rendered = format!(
            "{}:{}:{}: {}: {}",
            location.file,
            location.line,
            location.column,
            self.severity,
            self.message()
        );

        if let Some(line_text) = get_source_line(source, location.line) {
            let gutter = location.line.to_string();
            let padding = " ".repeat(gutter.len());
            let offset = " ".repeat(location.column.saturating_sub(1) as usize);
            let tildes = "~".repeat(location.length.saturating_sub(1) as usize);

            rendered.push_str(&format!("\n  {} | {}", gutter, line_text));
            rendered.push_str(&format!("\n  {} | {}^{}", padding, offset, tildes));
        }

        rendered
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.location(), self.severity, self.message())
    }
}
