//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations
//! - Function, object, union and template declarations
//! - Expressions and their precedence
//! - Control flow statements
//! - Error recovery

use std::rc::Rc;

use super::parser::{parse, Parser};
use crate::{
    ast::{
        ast::{Program, Stmt},
        declarations::{Access, MemberKind, ObjectKind, TemplateDefault, TemplateParameterKind, VarDeclKind},
        expressions::{Expr, LiteralKind, TemplatePart},
        types::{PrimitiveKind, Type},
    },
    config::Flags,
    errors::diagnostics::Diagnostic,
    lexer::{lexer::tokenize, tokens::TokenKind},
};

fn parse_with(source: &str, flags: Flags) -> (Program, Vec<Diagnostic>) {
    let tokens = tokenize(source, Some("test.zen")).unwrap();
    parse(tokens, Rc::new(String::from("test.zen")), flags)
}

fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
    parse_with(source, Flags::default())
}

fn parse_clean(source: &str) -> Program {
    let (program, diagnostics) = parse_source(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>()
    );
    program
}

fn error_names(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.error.get_error_name())
        .collect()
}

#[test]
fn test_parse_typed_declaration() {
    let program = parse_clean("int x = 42;");

    assert_eq!(program.declarations.len(), 1);
    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Static);
    assert_eq!(var.name, "x");
    assert!(matches!(var.var_type, Some(Type::Primitive(ref p)) if p.kind == PrimitiveKind::Int));
    assert!(matches!(
        var.initializer,
        Some(Expr::Literal(ref literal)) if literal.kind == LiteralKind::Number && literal.text == "42"
    ));
}

#[test]
fn test_parse_dynamic_declaration() {
    let program = parse_clean("let y = \"hi\";");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Dynamic);
    assert_eq!(var.name, "y");
    assert!(matches!(
        var.initializer,
        Some(Expr::Literal(ref literal)) if literal.kind == LiteralKind::String && literal.text == "hi"
    ));
}

#[test]
fn test_parse_hoisted_declaration() {
    let program = parse_clean("hoist var z;");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::Dynamic);
    assert!(var.is_hoisted);
    assert!(var.initializer.is_none());
}

#[test]
fn test_parse_const_without_type() {
    let program = parse_clean("const PI = 3.14;");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert!(var.is_const);
    assert_eq!(var.kind, VarDeclKind::Dynamic);
}

#[test]
fn test_parse_multi_declaration() {
    let program = parse_clean("int a = 1, b;");

    let Stmt::MultiVarDecl(multi) = &program.declarations[0] else {
        panic!("expected a multi declaration");
    };
    assert_eq!(multi.vars.len(), 2);
    assert_eq!(multi.vars[1].name, "b");
    assert!(multi.vars[1].initializer.is_none());
}

#[test]
fn test_constructor_call_makes_class_init() {
    let program = parse_clean("Point p = new Point(1, 2);");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.kind, VarDeclKind::ClassInit);
}

#[test]
fn test_unclosed_function_body_reports_once() {
    let source = "fun broken() {
    int x = 1;
    if (x > 0) {
        x = 2;
    }
fun ok() {
    return;
}
int y = 3;";
    let (program, diagnostics) = parse_source(source);

    assert_eq!(error_names(&diagnostics), vec!["UnclosedBlock"]);
    assert_eq!(program.declarations.len(), 3);
    assert!(matches!(&program.declarations[1], Stmt::FunctionDecl(f) if f.name == "ok"));
    assert!(matches!(&program.declarations[2], Stmt::VarDecl(v) if v.name == "y"));
}

#[test]
fn test_nested_unclosed_blocks_report_once() {
    let (_, diagnostics) = parse_source("fun f() { while (true) { if (x) { x = 1;");

    assert_eq!(error_names(&diagnostics), vec!["UnclosedBlock"]);
}

#[test]
fn test_recovery_resumes_after_statement() {
    let (program, diagnostics) = parse_source("int = ; let ok = 1;");

    assert_eq!(diagnostics.len(), 1);
    assert!(program.declarations[0].is_error());
    assert!(matches!(program.declarations.last(), Some(Stmt::VarDecl(v)) if v.name == "ok"));
}

#[test]
fn test_unexpected_top_level_tokens_are_skipped() {
    let (program, diagnostics) = parse_source(") ) ) int a = 1;");

    assert_eq!(
        error_names(&diagnostics),
        vec![
            "UnexpectedTopLevelToken",
            "UnexpectedTopLevelToken",
            "UnexpectedTopLevelToken"
        ]
    );
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_statement_error_inside_block() {
    let (program, diagnostics) = parse_source("fun f() { x = ; y = 2; }");

    assert_eq!(diagnostics.len(), 1);
    let Stmt::FunctionDecl(function) = &program.declarations[0] else {
        panic!("expected a function");
    };
    let body = function.body.as_ref().unwrap();
    assert_eq!(body.body.len(), 2);
    assert!(body.body[0].is_error());
    assert!(matches!(body.body[1], Stmt::Expression(_)));
}

#[test]
fn test_block_recovery_keeps_closing_brace() {
    let (program, diagnostics) = parse_source("fun f() { let a = 1 + * }\nint y = 2;");

    assert_eq!(error_names(&diagnostics), vec!["UnexpectedToken"]);
    assert_eq!(program.declarations.len(), 2);
    assert!(matches!(&program.declarations[1], Stmt::VarDecl(v) if v.name == "y"));
}

#[test]
fn test_class_body_recovery_keeps_closing_brace() {
    let (program, diagnostics) = parse_source("class C { int x = * } int z = 1;");

    assert_eq!(error_names(&diagnostics), vec!["UnexpectedToken"]);
    assert_eq!(program.declarations.len(), 2);
    assert!(matches!(&program.declarations[0], Stmt::ObjectDecl(o) if o.name == "C"));
    assert!(matches!(&program.declarations[1], Stmt::VarDecl(v) if v.name == "z"));
}

#[test]
fn test_synchronize_in_block_stops_before_close() {
    let tokens = tokenize("a ) } b", None).unwrap();
    let mut parser = Parser::new(tokens, Rc::new(String::from("shell")), Flags::default());

    parser.synchronize_in_block();
    assert_eq!(parser.current_token_kind(), TokenKind::CloseCurly);

    // Already in front of the closing brace: nothing is consumed.
    parser.synchronize_in_block();
    assert_eq!(parser.current_token_kind(), TokenKind::CloseCurly);
}

#[test]
fn test_synchronize_in_block_skips_inner_braces() {
    let tokens = tokenize("a { } ; b }", None).unwrap();
    let mut parser = Parser::new(tokens, Rc::new(String::from("shell")), Flags::default());

    parser.synchronize_in_block();
    assert_eq!(parser.position(), 4);
    assert_eq!(parser.current_token_kind(), TokenKind::Identifier);
}

#[test]
fn test_synchronize_always_advances() {
    let tokens = tokenize("a b c", None).unwrap();
    let mut parser = Parser::new(tokens, Rc::new(String::from("shell")), Flags::default());

    parser.synchronize();
    assert!(parser.position() > 0);
    assert_eq!(parser.current_token_kind(), TokenKind::EOF);

    // At EOF there is nothing left to skip, and reads stay on the sentinel.
    parser.synchronize();
    assert_eq!(parser.peek_kind(5), TokenKind::EOF);
}

#[test]
fn test_synchronize_stops_after_semicolon() {
    let tokens = tokenize("x ; y", None).unwrap();
    let mut parser = Parser::new(tokens, Rc::new(String::from("shell")), Flags::default());

    parser.synchronize();
    assert_eq!(parser.position(), 2);
}

#[test]
fn test_synchronize_stops_at_construct() {
    let tokens = tokenize("1 2 while", None).unwrap();
    let mut parser = Parser::new(tokens, Rc::new(String::from("shell")), Flags::default());

    parser.synchronize();
    assert_eq!(parser.current_token_kind(), TokenKind::While);
}

#[test]
fn test_binary_precedence() {
    let program = parse_clean("a = b + c * d;");

    let expected = [
        "ExprStmt",
        "  Binary =",
        "    Var a",
        "    Binary +",
        "      Var b",
        "      Binary *",
        "        Var c",
        "        Var d",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
}

#[test]
fn test_logical_precedence() {
    let program = parse_clean("x = a || b && c == d;");

    let expected = [
        "ExprStmt",
        "  Binary =",
        "    Var x",
        "    Binary ||",
        "      Var a",
        "      Binary &&",
        "        Var b",
        "        Binary ==",
        "          Var c",
        "          Var d",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
}

#[test]
fn test_assignment_is_right_associative() {
    let program = parse_clean("a = b = 1;");

    let Stmt::Expression(stmt) = &program.declarations[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Binary(outer) = &stmt.expression else {
        panic!("expected an assignment");
    };
    assert!(matches!(*outer.left, Expr::Var(_)));
    assert!(matches!(*outer.right, Expr::Binary(_)));
}

#[test]
fn test_subtraction_is_left_associative() {
    let program = parse_clean("x = 10 - 4 - 3;");

    let expected = [
        "ExprStmt",
        "  Binary =",
        "    Var x",
        "    Binary -",
        "      Binary -",
        "        Number 10",
        "        Number 4",
        "      Number 3",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
}

#[test]
fn test_postfix_chain() {
    let program = parse_clean("obj.items[0].run(1, 2);");

    let expected = [
        "ExprStmt",
        "  Call",
        "    Member run",
        "      Index",
        "        Member items",
        "          Var obj",
        "        Number 0",
        "    Number 1",
        "    Number 2",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
}

#[test]
fn test_prefix_and_postfix_operators() {
    let program = parse_clean("x = -a * !b; i++; --j;");

    let expected = [
        "ExprStmt",
        "  Binary =",
        "    Var x",
        "    Binary *",
        "      Unary - prefix",
        "        Var a",
        "      Unary ! prefix",
        "        Var b",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
    assert_eq!(
        program.declarations[1].to_tree_string(),
        "ExprStmt\n  Unary ++ postfix\n    Var i\n"
    );
    assert_eq!(
        program.declarations[2].to_tree_string(),
        "ExprStmt\n  Unary -- prefix\n    Var j\n"
    );
}

#[test]
fn test_lambda_with_expression_body() {
    let program = parse_clean("let f = (int a, b) -> int => a + b;");

    let expected = [
        "VarDecl dynamic f",
        "  Lambda(int a, b) -> int",
        "    Block",
        "      Return",
        "        Binary +",
        "          Var a",
        "          Var b",
        "",
    ]
    .join("\n");
    assert_eq!(program.declarations[0].to_tree_string(), expected);
}

#[test]
fn test_lambda_with_block_body() {
    let program = parse_clean("let f = (x) => { return x; };");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    let Some(Expr::Lambda(lambda)) = &var.initializer else {
        panic!("expected a lambda");
    };
    assert!(lambda.function.is_lambda());
    assert!(lambda.function.return_type.is_none());
    assert_eq!(lambda.function.params.len(), 1);
}

#[test]
fn test_deeply_nested_groupings() {
    let depth = 40;
    let mut source = String::from("x = ");
    for level in 0..depth {
        source.push_str(&format!("(a{} = ", level));
    }
    source.push('1');
    source.push_str(&")".repeat(depth));
    source.push(';');

    let program = parse_clean(&source);
    assert_eq!(program.declarations.len(), 1);

    let program = parse_clean("let f = ((int a) -> int => a);");
    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(var.initializer, Some(Expr::Lambda(_))));
}

#[test]
fn test_grouping_is_not_a_lambda() {
    let program = parse_clean("let g = (a + b) * 2; let h = (a);");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(var.initializer, Some(Expr::Binary(_))));
    let Stmt::VarDecl(var) = &program.declarations[1] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(var.initializer, Some(Expr::Var(_))));
}

#[test]
fn test_struct_initializer_after_typed_name() {
    let program = parse_clean("Point p = { .x = 1, y: 2 }; Point q = {1, 2};");

    let Stmt::VarDecl(p) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    let Some(Expr::StructInitializer(init)) = &p.initializer else {
        panic!("expected a struct initializer");
    };
    assert!(!init.is_positional);
    assert_eq!(init.fields[0].0.as_deref(), Some("x"));
    assert_eq!(init.fields[1].0.as_deref(), Some("y"));

    let Stmt::VarDecl(q) = &program.declarations[1] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(&q.initializer, Some(Expr::StructInitializer(init)) if init.is_positional));
}

#[test]
fn test_free_object_literal() {
    let program = parse_clean("let o = { name: \"n\", size: 2 }; var f = freeobj { a: 1 };");

    let Stmt::VarDecl(o) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(&o.initializer, Some(Expr::FreeObject(obj)) if obj.properties.len() == 2));

    let Stmt::VarDecl(f) = &program.declarations[1] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(&f.initializer, Some(Expr::FreeObject(_))));
}

#[test]
fn test_template_string() {
    let program = parse_clean("let s = `hi ${name}!`;");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    let Some(Expr::TemplateString(template)) = &var.initializer else {
        panic!("expected a template string");
    };
    assert_eq!(template.parts.len(), 3);
    assert_eq!(template.parts[0], TemplatePart::Text(String::from("hi ")));
    assert!(matches!(&template.parts[1], TemplatePart::Interpolation(Expr::Var(v)) if v.name == "name"));
}

#[test]
fn test_braces_required_by_default() {
    let (_, diagnostics) = parse_source("if (x) y = 1;");
    assert_eq!(error_names(&diagnostics), vec!["BracesRequired"]);

    let (program, diagnostics) = parse_with("if (x) y = 1; else y = 2;", Flags::braces_optional());
    assert!(diagnostics.is_empty());
    assert!(matches!(&program.declarations[0], Stmt::If(stmt) if stmt.else_branch.is_some()));
}

#[test]
fn test_else_if_chain_with_braces() {
    let program = parse_clean("if (a) { } else if (b) { } else { }");

    let Stmt::If(stmt) = &program.declarations[0] else {
        panic!("expected an if statement");
    };
    assert!(matches!(stmt.else_branch.as_deref(), Some(Stmt::If(_))));
}

#[test]
fn test_loops() {
    let program = parse_clean(
        "for (int i = 0; i < 10; i++) { } while (running) { } do { tick(); } while (busy)",
    );

    let Stmt::For(for_stmt) = &program.declarations[0] else {
        panic!("expected a for loop");
    };
    assert!(matches!(for_stmt.init.as_deref(), Some(Stmt::VarDecl(_))));
    assert!(for_stmt.condition.is_some());
    assert!(matches!(&for_stmt.increment, Some(Expr::Unary(u)) if !u.is_prefix));
    assert!(matches!(program.declarations[1], Stmt::While(_)));
    assert!(matches!(program.declarations[2], Stmt::DoWhile(_)));
}

#[test]
fn test_return_semicolon_is_optional() {
    let program = parse_clean("fun f() { return }");

    let Stmt::FunctionDecl(function) = &program.declarations[0] else {
        panic!("expected a function");
    };
    let body = function.body.as_ref().unwrap();
    assert!(matches!(&body.body[0], Stmt::Return(r) if r.value.is_none()));
}

#[test]
fn test_missing_semicolon_after_expression() {
    let (_, diagnostics) = parse_source("x = 42");
    assert_eq!(error_names(&diagnostics), vec!["UnexpectedTokenDetailed"]);
}

#[test]
fn test_function_forms() {
    let program = parse_clean(
        "fun add(int a, int b) -> int { return a + b; }
         fun int sub(int a, int b) { return a - b; }
         int mul(int a, int b) { return a * b; }
         fun make({int x, int y}) { }
         extern fun int puts(string s);",
    );

    let functions: Vec<_> = program
        .declarations
        .iter()
        .map(|stmt| match stmt {
            Stmt::FunctionDecl(function) => function,
            _ => panic!("expected a function"),
        })
        .collect();

    assert_eq!(functions.len(), 5);
    for function in &functions[..3] {
        assert!(matches!(&function.return_type, Some(t) if t.is_primitive(PrimitiveKind::Int)));
        assert_eq!(function.params.len(), 2);
    }
    assert!(functions[3].uses_param_struct_sugar);
    assert!(functions[3].return_type.is_none());
    assert_eq!(functions[4].name, "puts");
    assert!(functions[4].body.is_none());
}

#[test]
fn test_untyped_and_default_parameters() {
    let program = parse_clean("fun greet(name, let tag, int times = 1) { }");

    let Stmt::FunctionDecl(function) = &program.declarations[0] else {
        panic!("expected a function");
    };
    assert!(function.params[0].param_type.is_none());
    assert!(function.params[1].param_type.is_none());
    assert!(function.params[2].default_value.is_some());
}

#[test]
fn test_annotations_attach_to_functions() {
    let program = parse_clean("@Async @Route(path = \"/x\", 2) fun handler() { }");

    let Stmt::FunctionDecl(function) = &program.declarations[0] else {
        panic!("expected a function");
    };
    assert!(function.is_async);
    assert_eq!(function.annotations.len(), 2);
    assert_eq!(function.annotations[1].args[0].name.as_deref(), Some("path"));
    assert!(function.annotations[1].args[1].name.is_none());
}

#[test]
fn test_annotations_rejected_on_other_declarations() {
    let (program, diagnostics) = parse_source("@Inline int x = 1;");
    assert_eq!(error_names(&diagnostics), vec!["AnnotationsNotAllowed"]);
    assert!(matches!(program.declarations[0], Stmt::VarDecl(_)));

    let (_, diagnostics) = parse_source("int y; @Dangling");
    assert_eq!(error_names(&diagnostics), vec!["MisplacedAnnotations"]);
}

#[test]
fn test_imports() {
    let program = parse_clean("import std.io; import \"lib/net\"; import java util.List");

    let paths: Vec<(&str, bool)> = program
        .declarations
        .iter()
        .map(|stmt| match stmt {
            Stmt::Import(import) => (import.path.as_str(), import.is_foreign),
            _ => panic!("expected an import"),
        })
        .collect();
    assert_eq!(
        paths,
        vec![("std.io", false), ("lib/net", false), ("util.List", true)]
    );
}

#[test]
fn test_class_members() {
    let source = "class Animal : Base {
    string name;
    public Animal(string n) : name(n) { }
    fun speak() -> string { return name; }
    privatew int age = 3;
    static const int legs = 4;
    int operator +(Animal other) { return 1; }
}";
    let program = parse_clean(source);

    let Stmt::ObjectDecl(object) = &program.declarations[0] else {
        panic!("expected a class");
    };
    assert_eq!(object.kind, ObjectKind::Class);
    assert_eq!(object.base_name.as_deref(), Some("Base"));
    assert_eq!(object.members.len(), 5);
    assert_eq!(object.operators.len(), 1);
    assert_eq!(object.operators[0].op, "+");
    assert_eq!(object.auto_accessors, vec![String::from("age")]);

    assert_eq!(object.members[0].flags.access(), Access::Private);
    let constructor = object.constructor().unwrap();
    assert_eq!(constructor.flags.access(), Access::Public);
    assert_eq!(constructor.initializers[0].field, "name");

    let speak = object.find_member("speak").unwrap();
    assert_eq!(speak.kind(), MemberKind::Method);
    assert!(matches!(&speak.member_type, Some(t) if t.is_primitive(PrimitiveKind::String)));

    let legs = object.find_member("legs").unwrap();
    assert!(legs.flags.is_static());
    assert!(legs.flags.is_const());
}

#[test]
fn test_struct_members_default_to_public() {
    let program = parse_clean("struct P { int x; let tag; }");

    let Stmt::ObjectDecl(object) = &program.declarations[0] else {
        panic!("expected a struct");
    };
    assert_eq!(object.kind, ObjectKind::Struct);
    assert!(object
        .members
        .iter()
        .all(|member| member.flags.access() == Access::Public));
    assert!(matches!(object.members[1].member_type, Some(Type::Dynamic(_))));
}

#[test]
fn test_actor_message_handler() {
    let program = parse_clean("actor Counter { int count; on Increment(int by) { count += by; } }");

    let Stmt::ObjectDecl(object) = &program.declarations[0] else {
        panic!("expected an actor");
    };
    assert_eq!(object.kind, ObjectKind::Actor);
    assert_eq!(object.members[1].kind(), MemberKind::MessageHandler);
    assert_eq!(object.members[1].name, "Increment");
}

#[test]
fn test_message_handler_outside_actor() {
    let (program, diagnostics) = parse_source("class C { on Msg() { } } int after = 1;");

    assert_eq!(error_names(&diagnostics), vec!["MessageHandlerOutsideActor"]);
    assert!(matches!(program.declarations.last(), Some(Stmt::VarDecl(_))));
}

#[test]
fn test_operator_needs_return_type() {
    let (_, diagnostics) = parse_source("class V { operator +(V o) { return o; } }");

    assert_eq!(error_names(&diagnostics), vec!["MissingOperatorReturnType"]);
}

#[test]
fn test_union_declaration() {
    let program = parse_clean("union Value { int, string, [int] }");

    let Stmt::UnionDecl(union) = &program.declarations[0] else {
        panic!("expected a union");
    };
    assert_eq!(union.name, "Value");
    assert_eq!(union.member_types.len(), 3);
}

#[test]
fn test_template_declaration() {
    let program = parse_clean(
        "template <typename T = int, int N = 4, typename... Rest> class Box { T value; }",
    );

    let Stmt::TemplateDecl(template) = &program.declarations[0] else {
        panic!("expected a template");
    };
    assert_eq!(template.params.len(), 3);
    assert_eq!(template.params[0].kind, TemplateParameterKind::Type);
    assert!(matches!(template.params[0].default, Some(TemplateDefault::Type(_))));
    assert_eq!(template.params[1].kind, TemplateParameterKind::NonType);
    assert!(matches!(template.params[1].default, Some(TemplateDefault::Value(_))));
    assert!(template.params[2].is_variadic);
    assert!(matches!(*template.inner, Stmt::ObjectDecl(_)));
}

#[test]
fn test_template_types() {
    let program = parse_clean("Map<string, [int; 4]> m; bool less = a < b;");

    let Stmt::VarDecl(var) = &program.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(var.var_type.as_ref().unwrap().to_string(), "Map<string, [int]>");

    let Stmt::VarDecl(var) = &program.declarations[1] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(var.initializer, Some(Expr::Binary(_))));
}

#[test]
fn test_empty_program() {
    let (program, diagnostics) = parse_source("");

    assert!(program.declarations.is_empty());
    assert!(diagnostics.is_empty());
}
