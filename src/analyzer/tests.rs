use std::rc::Rc;

use super::{
    analyzer::analyze,
    compatibility::{compatible, widens},
    symbol_table::{Declaration, SymbolInfo, SymbolKind, SymbolTable},
};
use crate::{
    ast::{
        ast::{Program, Stmt},
        types::{PrimitiveKind, Type},
    },
    config::Flags,
    errors::diagnostics::{Diagnostic, Severity},
    lexer::lexer::tokenize,
    parser::parser::parse,
    SourceLocation,
};

fn parse_program(source: &str) -> Program {
    let tokens = tokenize(source, Some("test.zen")).unwrap();
    let (program, diagnostics) = parse(tokens, Rc::new(String::from("test.zen")), Flags::default());
    assert!(
        diagnostics.is_empty(),
        "unexpected parse diagnostics: {:?}",
        diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>()
    );
    program
}

fn analyze_source(source: &str) -> Vec<Diagnostic> {
    let program = parse_program(source);
    let (_, diagnostics) = analyze(&program);
    diagnostics
}

fn error_names(source: &str) -> Vec<String> {
    analyze_source(source)
        .iter()
        .map(|diagnostic| String::from(diagnostic.error.get_error_name()))
        .collect()
}

fn assert_clean(source: &str) {
    let names = error_names(source);
    assert!(names.is_empty(), "unexpected diagnostics: {:?}", names);
}

fn loc() -> SourceLocation {
    SourceLocation::new(1, 1, 1, Rc::new(String::from("test.zen")))
}

fn int() -> Type {
    Type::primitive(PrimitiveKind::Int, loc())
}

// Symbol table

#[test]
fn test_declare_and_lookup_across_scopes() {
    let program = parse_program("int x; int y;");
    let Stmt::VarDecl(x) = &program.declarations[0] else {
        panic!("expected a variable");
    };
    let Stmt::VarDecl(y) = &program.declarations[1] else {
        panic!("expected a variable");
    };

    let mut table = SymbolTable::new();
    let info = |decl| SymbolInfo::new(SymbolKind::Variable, int(), Declaration::Variable(decl), loc());

    table.declare("x", info(x)).unwrap();
    table.enter_scope();
    table.declare("y", info(y)).unwrap();

    assert_eq!(table.depth(), 2);
    assert!(table.lookup("x").is_some());
    assert!(table.lookup("y").is_some());
    assert!(table.lookup_current_scope("x").is_none());
    assert!(table.lookup_kind("x", SymbolKind::Function).is_none());

    table.exit_scope().unwrap();
    assert!(table.lookup("y").is_none());
    assert!(table.lookup("x").is_some());
}

#[test]
fn test_shadowing_and_redeclaration() {
    let program = parse_program("int x; string x2;");
    let Stmt::VarDecl(x) = &program.declarations[0] else {
        panic!("expected a variable");
    };

    let mut table = SymbolTable::new();
    let string_type = Type::primitive(PrimitiveKind::String, loc());

    table
        .declare("x", SymbolInfo::new(SymbolKind::Variable, int(), Declaration::Variable(x), loc()))
        .unwrap();

    let error = table
        .declare(
            "x",
            SymbolInfo::new(SymbolKind::Variable, string_type.clone(), Declaration::Variable(x), loc()),
        )
        .unwrap_err();
    assert_eq!(error.get_error_name(), "Redeclaration");
    assert_eq!(table.lookup("x").unwrap().resolved_type.to_string(), "int");

    table.enter_scope();
    table
        .declare("x", SymbolInfo::new(SymbolKind::Variable, string_type, Declaration::Variable(x), loc()))
        .unwrap();
    assert_eq!(table.lookup("x").unwrap().resolved_type.to_string(), "string");

    table.exit_scope().unwrap();
    assert_eq!(table.lookup("x").unwrap().resolved_type.to_string(), "int");
}

#[test]
fn test_exit_global_scope_underflows() {
    let mut table = SymbolTable::new();

    let error = table.exit_scope().unwrap_err();
    assert_eq!(error.get_error_name(), "ScopeUnderflow");
    assert_eq!(error.get_severity(), Severity::InternalError);
    assert_eq!(table.depth(), 1);
}

#[test]
fn test_tree_string() {
    let program = parse_program("int a = 1; const b = 2; fun f() -> int { return a; }");
    let (table, diagnostics) = analyze(&program);

    assert!(diagnostics.is_empty());
    assert_eq!(
        table.to_tree_string(),
        "Scope 0\n  a: Variable int\n  b: Variable dynamic [const]\n  f: Function () -> int\n"
    );
}

// Compatibility

#[test]
fn test_compatibility_is_reflexive_and_widening_is_one_way() {
    let table = SymbolTable::new();
    let long = Type::primitive(PrimitiveKind::Long, loc());
    let double = Type::primitive(PrimitiveKind::Double, loc());

    assert!(compatible(&table, &int(), &int()));
    assert!(compatible(&table, &long, &int()));
    assert!(!compatible(&table, &int(), &long));
    assert!(compatible(&table, &double, &int()));
    assert!(!compatible(&table, &int(), &double));

    assert!(widens(PrimitiveKind::Byte, PrimitiveKind::Int));
    assert!(widens(PrimitiveKind::Float, PrimitiveKind::Double));
    assert!(!widens(PrimitiveKind::Double, PrimitiveKind::Float));
}

#[test]
fn test_dynamic_and_error_types() {
    let table = SymbolTable::new();
    let dynamic = Type::Dynamic(loc());
    let error = Type::Error(loc());

    assert!(compatible(&table, &int(), &dynamic));
    assert!(compatible(&table, &dynamic, &int()));
    assert!(!compatible(&table, &int(), &error));
    assert!(!compatible(&table, &error, &error));
}

#[test]
fn test_inheritance_is_directional() {
    let program = parse_program("class B { } class A : B { }");
    let (table, diagnostics) = analyze(&program);

    assert!(diagnostics.is_empty());
    let base = Type::named("B", loc());
    let derived = Type::named("A", loc());
    assert!(compatible(&table, &base, &derived));
    assert!(!compatible(&table, &derived, &base));
}

#[test]
fn test_inheritance_in_declarations() {
    assert_clean("class B { } class A : B { } B b = new A();");
    assert_eq!(
        error_names("class B { } class A : B { } A a = new B();"),
        vec!["InitializerTypeMismatch"]
    );
}

// Declarations

#[test]
fn test_assignment_mismatch_keeps_declared_type() {
    let program = parse_program("int a; a = \"text\";");
    let (table, diagnostics) = analyze(&program);

    let names: Vec<&str> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.error.get_error_name())
        .collect();
    assert_eq!(names, vec!["AssignmentTypeMismatch"]);
    assert_eq!(
        diagnostics[0].message(),
        "type mismatch in assignment: cannot assign 'string' to 'int'"
    );
    assert_eq!(table.lookup("a").unwrap().resolved_type.to_string(), "int");
}

#[test]
fn test_numeric_initializers() {
    assert_clean("long l = 1; double d = 1 + 2.5; float f = 2;");
    assert_eq!(error_names("long l = 1; int i = l;"), vec!["InitializerTypeMismatch"]);
    assert_eq!(error_names("int i = 1 + 2.5;"), vec!["InitializerTypeMismatch"]);
}

#[test]
fn test_undeclared_identifier_reports_once() {
    assert_eq!(error_names("x = 1;"), vec!["UndeclaredIdentifier"]);
    assert_eq!(error_names("int y = z + 1; int z = 1;"), vec!["UndeclaredIdentifier"]);
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert_eq!(error_names("int a; string a;"), vec!["Redeclaration"]);
    assert_clean("int a; fun f() { string a = \"inner\"; }");
}

#[test]
fn test_unknown_and_non_types() {
    assert_eq!(error_names("Missing m;"), vec!["UnknownType"]);
    assert_eq!(error_names("int value; value other;"), vec!["NotAType"]);
}

#[test]
fn test_dynamic_declarations() {
    assert_clean("let x = 1; x = \"now a string\"; let y: dynamic = 2;");
    assert_eq!(error_names("let x: int = 1;"), vec!["DynamicTypeConflict"]);
}

#[test]
fn test_constants() {
    assert_eq!(error_names("const int x;"), vec!["ConstWithoutInitializer"]);
    assert_eq!(error_names("const int x = 1; x = 2;"), vec!["AssignToConstant"]);
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(error_names("int a; 1 = a;"), vec!["InvalidAssignmentTarget"]);
}

#[test]
fn test_increment_of_non_lvalue_reports_only_the_target() {
    assert_eq!(error_names("\"s\"++;"), vec!["InvalidAssignmentTarget"]);
    assert_eq!(error_names("string s; s++;"), vec!["NonNumericOperand"]);
}

// Functions

#[test]
fn test_recursion_and_forward_references() {
    assert_clean(
        "fun even(int n) -> bool { return odd(n); }
         fun odd(int n) -> bool { return even(n); }
         fun fact(int n) -> int { return n * fact(n - 1); }",
    );
}

#[test]
fn test_return_checks() {
    assert_eq!(error_names("fun f() -> int { return \"s\"; }"), vec!["ReturnTypeMismatch"]);
    assert_eq!(error_names("fun g() { return 1; }"), vec!["ReturnValueFromVoid"]);
    assert_eq!(error_names("fun h() -> int { return; }"), vec!["MissingReturnValue"]);
    assert_eq!(error_names("return 1;"), vec!["ReturnOutsideFunction"]);
    assert_clean("fun k() { return; } fun l() -> long { return 1; }");
}

#[test]
fn test_lambdas_need_return_type() {
    assert_eq!(error_names("let f = (int a) => a;"), vec!["LambdaReturnTypeRequired"]);
    assert_clean("let g = (int a) -> int => a + 1; let r = g(2);");
    assert_eq!(
        error_names("let h = (int a) -> int => \"no\";"),
        vec!["ReturnTypeMismatch"]
    );
}

#[test]
fn test_call_arity_and_defaults() {
    let decl = "fun add(int a, int b = 2) -> int { return a + b; } ";

    assert_clean(&format!("{decl} int x = add(1); int y = add(1, 3);"));
    assert_eq!(error_names(&format!("{decl} add();")), vec!["MissingArguments"]);
    assert_eq!(error_names(&format!("{decl} add(1, 2, 3);")), vec!["UnexpectedArguments"]);
    assert_eq!(error_names(&format!("{decl} add(\"x\");")), vec!["ArgumentTypeMatchError"]);
}

#[test]
fn test_default_value_type() {
    assert_eq!(
        error_names("fun f(int a = \"one\") { }"),
        vec!["DefaultValueTypeMismatch"]
    );
}

#[test]
fn test_call_result_type() {
    assert_eq!(
        error_names("fun name() -> string { return \"n\"; } int n = name();"),
        vec!["InitializerTypeMismatch"]
    );
    assert_eq!(error_names("int x = 1; x();"), vec!["NotCallable"]);
}

// Expressions

#[test]
fn test_binary_operand_checks() {
    assert_eq!(error_names("int a = 1 + \"s\";"), vec!["InitializerTypeMismatch"]);
    assert_clean("string s = \"n = \" + 1;");
    assert_eq!(error_names("bool b = 1 && true;"), vec!["BinaryOperandMismatch"]);
    assert_eq!(error_names("int c = true * 2;"), vec!["BinaryOperandMismatch"]);
    assert_eq!(error_names("bool d = \"a\" < 1;"), vec!["BinaryOperandMismatch"]);
    assert_clean("bool e = 1 < 2.5; bool f = \"a\" == \"b\";");
}

#[test]
fn test_unary_operand_checks() {
    assert_clean("int i = 0; i++; --i; int n = -i; bool b = !true;");
    assert_eq!(error_names("string s = \"x\"; s++;"), vec!["NonNumericOperand"]);
}

#[test]
fn test_conditions_must_be_bool() {
    assert_eq!(error_names("if (1) { }"), vec!["ConditionNotBool"]);
    assert_clean("bool running = true; while (running) { running = false; }");
    assert_clean("for (int i = 0; i < 10; i++) { } let d = 1; if (d) { }");
}

#[test]
fn test_this_outside_object() {
    assert_eq!(error_names("let t = this;"), vec!["ThisOutsideObject"]);
}

#[test]
fn test_arrays() {
    assert_clean("[int] xs; int first = xs[0]; int n = xs.length; string s = \"abc\"; int m = s.length;");
    assert_eq!(error_names("[int] xs; xs[\"a\"];"), vec!["IndexNotInt"]);
    assert_eq!(error_names("int x = 1; x[0];"), vec!["NotIndexable"]);
}

// Objects

#[test]
fn test_member_access() {
    let decl = "struct P { int x; fun get() -> int { return x; } } P p = new P(); ";

    assert_clean(&format!("{decl} int v = p.x; int w = p.get();"));
    assert_eq!(error_names(&format!("{decl} p.nope;")), vec!["UnknownMember"]);
    assert_eq!(error_names(&format!("{decl} string s = p.x;")), vec!["InitializerTypeMismatch"]);
}

#[test]
fn test_constructor_arguments_and_initializers() {
    let decl = "class Animal { string name; Animal(string n) : name(n) { } } ";

    assert_clean(&format!("{decl} Animal a = new Animal(\"rex\");"));
    assert_eq!(
        error_names(&format!("{decl} Animal b = new Animal(1);")),
        vec!["ArgumentTypeMatchError"]
    );
    assert_eq!(
        error_names("class C { int age; C(string n) : age(n), size(1) { } }"),
        vec!["FieldTypeMatchError", "UnknownField"]
    );
}

#[test]
fn test_new_requires_an_object() {
    assert_eq!(error_names("let a = new Nothing();"), vec!["UnknownType"]);
    assert_eq!(error_names("int x = 1; let a = new x();"), vec!["NotAnObject"]);
}

#[test]
fn test_inherited_members_and_this() {
    assert_clean(
        "class Base { int x; }
         class Derived : Base {
             fun get() -> int { return x; }
             fun me() -> Derived { return this; }
         }
         Derived d = new Derived();
         int v = d.x;",
    );
    assert_eq!(error_names("class D : Nowhere { }"), vec!["UnknownBaseClass"]);
}

#[test]
fn test_inheritance_cycles() {
    assert_eq!(error_names("class S : S { }"), vec!["InheritanceCycle"]);
    assert_eq!(
        error_names("class A : B { } class B : A { }"),
        vec!["InheritanceCycle", "InheritanceCycle"]
    );
    assert_clean("class A { } class B : A { } class C : B { }");
}

#[test]
fn test_field_initializers() {
    assert_eq!(
        error_names("class C { int count = \"zero\"; }"),
        vec!["InitializerTypeMismatch"]
    );
}

#[test]
fn test_operator_overload_result() {
    assert_clean("class V { int operator +(V o) { return 1; } } V a = new V(); int s = a + a;");
}

#[test]
fn test_struct_initializers() {
    let decl = "struct P { int x; int y; } ";

    assert_clean(&format!("{decl} P a = {{ .x = 1, .y = 2 }}; P b = {{1, 2}};"));
    assert_eq!(
        error_names(&format!("{decl} P b = {{1, \"two\"}};")),
        vec!["FieldTypeMatchError"]
    );
    assert_eq!(
        error_names(&format!("{decl} P c = {{1, 2, 3}};")),
        vec!["TooManyPositionalFields"]
    );
    assert_eq!(error_names(&format!("{decl} P d = {{ .z = 1 }};")), vec!["UnknownField"]);
}

#[test]
fn test_actor_handlers() {
    assert_clean("actor Counter { int count; on Increment(int by) { count += by; } }");
    assert_eq!(
        error_names("actor Counter { int count; on Rename(string s) { count = s; } }"),
        vec!["AssignmentTypeMismatch"]
    );
}

// Unions and templates

#[test]
fn test_union_membership() {
    let decl = "union Value { int, string } ";

    assert_clean(&format!("{decl} Value v = 1; Value w = \"s\";"));
    assert_eq!(error_names(&format!("{decl} Value z = true;")), vec!["InitializerTypeMismatch"]);
    assert_eq!(error_names("union Bad { int, dynamic }"), vec!["DynamicUnionMember"]);
}

#[test]
fn test_self_referential_unions() {
    assert_eq!(
        error_names("union U { U, U } U u = true;"),
        vec!["RecursiveUnion", "InitializerTypeMismatch"]
    );
    assert_eq!(
        error_names("union U { U, int } U u = 1; U w = true;"),
        vec!["RecursiveUnion", "InitializerTypeMismatch"]
    );
}

#[test]
fn test_mutually_referential_unions() {
    let decl = "union A { B, int } union B { A, string } ";

    assert_eq!(
        error_names(&format!("{decl} A a = \"s\"; A b = true;")),
        vec!["RecursiveUnion", "RecursiveUnion", "InitializerTypeMismatch"]
    );

    let program = parse_program(decl);
    let (table, _) = analyze(&program);
    let union = Type::named("A", loc());
    assert!(compatible(&table, &union, &int()));
    assert!(!compatible(&table, &union, &Type::primitive(PrimitiveKind::Bool, loc())));
}

#[test]
fn test_template_parameters_are_dynamic() {
    assert_clean("template <typename T> fun id(T x) -> T { return x; } int n = id(1);");
    assert_clean("template <typename T> class Box { T value; } Box<int> b;");
    assert_eq!(
        error_names("template <int N = \"s\"> class Buf { }"),
        vec!["DefaultValueTypeMismatch"]
    );
}

#[test]
fn test_template_types_compare_arguments() {
    let decl = "template <typename T> class Box { T value; } ";

    assert_clean(&format!("{decl} Box<int> a; Box<int> b = a;"));
    assert_eq!(
        error_names(&format!("{decl} Box<int> a; Box<string> b = a;")),
        vec!["InitializerTypeMismatch"]
    );
}

// Imports

#[test]
fn test_imports_are_warnings() {
    let diagnostics = analyze_source("import std.io;");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].error.get_error_name(), "ImportNotResolved");
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert!(!diagnostics[0].is_error());
}
