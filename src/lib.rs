#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::{
    analyzer::{analyzer::analyze, symbol_table::SymbolTable},
    ast::ast::Program,
    config::Flags,
    errors::diagnostics::Diagnostic,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// A region of source text: 1-based line and column, plus the length of the
/// underlined lexeme in characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub file: Rc<String>,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32, length: u32, file: Rc<String>) -> Self {
        SourceLocation {
            line,
            column,
            length,
            file,
        }
    }

    pub fn null() -> Self {
        SourceLocation::new(0, 0, 0, Rc::new(String::from("<null>")))
    }

    /// Extends this location up to the end of `end` when both sit on the same line.
    pub fn to(&self, end: &SourceLocation) -> SourceLocation {
        let mut merged = self.clone();
        if end.line == self.line && end.column + end.length > self.column + self.length {
            merged.length = end.column + end.length - self.column;
        }
        merged
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Returns the text of the 1-based `line` in `source`, without its line break.
pub fn get_source_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth((line - 1) as usize)
        .map(|text| text.strip_suffix('\r').unwrap_or(text))
}

/// Everything the front end produces for one file.
pub struct CheckResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|diagnostic| diagnostic.is_error())
    }
}

/// Runs tokenize, parse and analyze over one source file.
///
/// A lexical error stops the pipeline early with an empty program; parse and
/// semantic diagnostics are collected in order of discovery.
pub fn check_source(source: &str, file: &str, flags: Flags) -> CheckResult {
    let file = Rc::new(String::from(file));

    let tokens = match tokenize(source, Some(file.as_str())) {
        Ok(tokens) => tokens,
        Err(error) => {
            return CheckResult {
                program: Program::empty(Rc::clone(&file)),
                diagnostics: vec![Diagnostic::from(error)],
            }
        }
    };

    let (program, mut diagnostics) = parse(tokens, Rc::clone(&file), flags);
    let (_, semantic) = analyze(&program);
    diagnostics.extend(semantic);

    CheckResult {
        program,
        diagnostics,
    }
}

/// Analyzes an already parsed program and renders its global scope.
pub fn dump_symbols(program: &Program) -> String {
    let (table, _): (SymbolTable, _) = analyze(program);
    table.to_tree_string()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{get_source_line, SourceLocation};

    #[test]
    fn test_get_source_line() {
        let source = "Hello, world!\nsecond\r\n\nTesting { }\n";

        assert_eq!(get_source_line(source, 1), Some("Hello, world!"));
        assert_eq!(get_source_line(source, 2), Some("second"));
        assert_eq!(get_source_line(source, 3), Some(""));
        assert_eq!(get_source_line(source, 4), Some("Testing { }"));
        assert_eq!(get_source_line(source, 0), None);
        assert_eq!(get_source_line(source, 9), None);
    }

    #[test]
    fn test_location_merge_same_line() {
        let file = Rc::new(String::from("test.zen"));
        let start = SourceLocation::new(3, 5, 1, Rc::clone(&file));
        let end = SourceLocation::new(3, 12, 3, Rc::clone(&file));

        assert_eq!(start.to(&end).length, 10);

        let other_line = SourceLocation::new(4, 1, 3, file);
        assert_eq!(start.to(&other_line).length, 1);
    }
}
