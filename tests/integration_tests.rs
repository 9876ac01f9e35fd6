//! Integration tests for the whole front end.
//!
//! These tests run source text through tokenizing, parsing and semantic
//! analysis via `check_source`, and check the resulting tree, diagnostics and
//! rendered output.

use zenith::{
    ast::{
        ast::Stmt,
        declarations::VarDeclKind,
        expressions::{Expr, LiteralKind},
        types::PrimitiveKind,
    },
    check_source,
    config::Flags,
    dump_symbols,
    errors::diagnostics::Severity,
    CheckResult,
};

fn check(source: &str) -> CheckResult {
    check_source(source, "main.zen", Flags::default())
}

fn error_names(result: &CheckResult) -> Vec<&str> {
    result
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.error.get_error_name())
        .collect()
}

#[test]
fn test_typed_declaration() {
    let result = check("int x = 42;");
    assert!(result.diagnostics.is_empty());

    let Stmt::VarDecl(var) = &result.program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Static);
    assert_eq!(var.name, "x");
    assert!(matches!(&var.var_type, Some(t) if t.is_primitive(PrimitiveKind::Int)));
    assert!(matches!(
        &var.initializer,
        Some(Expr::Literal(literal)) if literal.kind == LiteralKind::Number && literal.text == "42"
    ));
}

#[test]
fn test_dynamic_declaration() {
    let result = check("let y = \"hi\";");
    assert!(result.diagnostics.is_empty());

    let Stmt::VarDecl(var) = &result.program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Dynamic);
    assert_eq!(var.name, "y");
    assert!(matches!(
        &var.initializer,
        Some(Expr::Literal(literal)) if literal.kind == LiteralKind::String && literal.text == "hi"
    ));
}

#[test]
fn test_hoisted_declaration() {
    let result = check("hoist var z;");
    assert!(result.diagnostics.is_empty());

    let Stmt::VarDecl(var) = &result.program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Dynamic);
    assert!(var.is_hoisted);
    assert!(var.initializer.is_none());
}

#[test]
fn test_unclosed_body_keeps_later_declarations() {
    let source = "fun broken() {
    int x = 1;
fun ok() -> int {
    return 1;
}
int y = ok();";
    let result = check(source);

    assert_eq!(error_names(&result), vec!["UnclosedBlock"]);
    assert!(matches!(&result.program.declarations[1], Stmt::FunctionDecl(f) if f.name == "ok"));
    assert!(matches!(&result.program.declarations[2], Stmt::VarDecl(v) if v.name == "y"));
}

#[test]
fn test_assignment_mismatch_is_reported_once() {
    let source = "int a;\na = \"text\";";
    let result = check(source);

    assert_eq!(error_names(&result), vec!["AssignmentTypeMismatch"]);
    assert!(result.has_errors());
    assert!(dump_symbols(&result.program).contains("  a: Variable int\n"));

    let rendered = result.diagnostics[0].render(source);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines[0],
        "main.zen:2:1: error: type mismatch in assignment: cannot assign 'string' to 'int'"
    );
    assert_eq!(lines[1], "  2 | a = \"text\";");
    assert!(lines[2].starts_with("    | ^~~"));
}

#[test]
fn test_inheritance_direction() {
    assert!(check("class B { } class A : B { } B b = new A();")
        .diagnostics
        .is_empty());
    assert_eq!(
        error_names(&check("class B { } class A : B { } A a = new B();")),
        vec!["InitializerTypeMismatch"]
    );
}

#[test]
fn test_lex_error_stops_early() {
    let result = check("int a = 1;\nstring s = \"open");

    assert_eq!(error_names(&result), vec!["UnterminatedString"]);
    assert!(result.program.declarations.is_empty());
    assert_eq!(result.diagnostics[0].location().line, 2);
}

#[test]
fn test_parse_and_semantic_errors_together() {
    let result = check("int = ;\nint a = \"s\";\nundefined_name;");

    assert_eq!(
        error_names(&result),
        vec!["UnexpectedTokenDetailed", "InitializerTypeMismatch", "UndeclaredIdentifier"]
    );
}

#[test]
fn test_warnings_do_not_fail_the_check() {
    let result = check("import std.io;\nint a = 1;");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    assert!(!result.has_errors());
    assert!(result.diagnostics[0]
        .render("import std.io;\nint a = 1;")
        .starts_with("main.zen:1:1: warning: "));
}

#[test]
fn test_braces_flag() {
    let source = "bool ok = true; int y; if (ok) y = 1;";

    assert_eq!(error_names(&check(source)), vec!["BracesRequired"]);
    assert!(check_source(source, "main.zen", Flags::braces_optional())
        .diagnostics
        .is_empty());
}

#[test]
fn test_program_tree_dump() {
    let result = check("int x = 1 + 2;");

    let tree = result.program.to_tree_string();
    assert!(tree.starts_with("Program\n"));
    assert!(tree.contains("x"));
}
