//! Indentation-based textual dump of the AST.
//!
//! Each node prints on its own line, children two spaces deeper than their
//! parent. The format is stable so it can be compared in snapshot tests.

use super::{
    ast::{Program, Stmt},
    declarations::{
        FunctionDecl, MemberDecl, MemberKind, ObjectDecl, Parameter, TemplateDecl,
        TemplateDefault, TemplateParameter, TemplateParameterKind, VarDecl, VarDeclKind,
    },
    expressions::{Expr, LiteralKind, TemplatePart},
    statements::{Annotation, BlockStmt},
};

struct TreeWriter {
    out: String,
    depth: usize,
}

impl TreeWriter {
    fn new() -> Self {
        TreeWriter {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn nested(&mut self, write: impl FnOnce(&mut TreeWriter)) {
        self.depth += 1;
        write(self);
        self.depth -= 1;
    }

    fn labeled(&mut self, label: &str, write: impl FnOnce(&mut TreeWriter)) {
        self.line(label);
        self.nested(write);
    }
}

impl Program {
    pub fn to_tree_string(&self) -> String {
        let mut writer = TreeWriter::new();
        writer.line("Program");
        writer.nested(|writer| {
            for declaration in &self.declarations {
                write_stmt(writer, declaration);
            }
        });
        writer.out
    }
}

impl Stmt {
    pub fn to_tree_string(&self) -> String {
        let mut writer = TreeWriter::new();
        write_stmt(&mut writer, self);
        writer.out
    }
}

impl Expr {
    pub fn to_tree_string(&self) -> String {
        let mut writer = TreeWriter::new();
        write_expr(&mut writer, self);
        writer.out
    }
}

fn params_text(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|param| match &param.param_type {
            Some(param_type) => format!("{} {}", param_type, param.name),
            None => param.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_defaults(writer: &mut TreeWriter, params: &[Parameter]) {
    for param in params {
        if let Some(default) = &param.default_value {
            writer.labeled(&format!("Default {}", param.name), |writer| {
                write_expr(writer, default)
            });
        }
    }
}

fn write_annotations(writer: &mut TreeWriter, annotations: &[Annotation]) {
    for annotation in annotations {
        write_annotation(writer, annotation);
    }
}

fn write_annotation(writer: &mut TreeWriter, annotation: &Annotation) {
    writer.line(format!("@{}", annotation.name));
    writer.nested(|writer| {
        for arg in &annotation.args {
            match &arg.name {
                Some(name) => writer.labeled(&format!("{} =", name), |writer| {
                    write_expr(writer, &arg.value)
                }),
                None => write_expr(writer, &arg.value),
            }
        }
    });
}

fn write_block(writer: &mut TreeWriter, block: &BlockStmt) {
    writer.line("Block");
    writer.nested(|writer| {
        for stmt in block.iter() {
            write_stmt(writer, stmt);
        }
    });
}

fn write_var_decl(writer: &mut TreeWriter, var: &VarDecl) {
    let kind = match var.kind {
        VarDeclKind::Static => "static",
        VarDeclKind::Dynamic => "dynamic",
        VarDeclKind::ClassInit => "class-init",
    };

    let mut header = format!("VarDecl {} {}", kind, var.name);
    if let Some(var_type) = &var.var_type {
        header.push_str(&format!(": {}", var_type));
    }
    if var.is_hoisted {
        header.push_str(" [hoisted]");
    }
    if var.is_const {
        header.push_str(" [const]");
    }

    writer.line(header);
    if let Some(initializer) = &var.initializer {
        writer.nested(|writer| write_expr(writer, initializer));
    }
}

fn write_function(writer: &mut TreeWriter, label: &str, function: &FunctionDecl) {
    let mut header = format!("{}({})", label, params_text(&function.params));
    if let Some(return_type) = &function.return_type {
        header.push_str(&format!(" -> {}", return_type));
    }
    if function.is_async {
        header.push_str(" [async]");
    }
    if function.uses_param_struct_sugar {
        header.push_str(" [struct-sugar]");
    }
    if function.body.is_none() {
        header.push_str(" [extern]");
    }

    writer.line(header);
    writer.nested(|writer| {
        write_annotations(writer, &function.annotations);
        write_defaults(writer, &function.params);
        if let Some(body) = &function.body {
            write_block(writer, body);
        }
    });
}

fn write_member(writer: &mut TreeWriter, member: &MemberDecl) {
    let flags = member.flags;
    let kind = match flags.kind() {
        MemberKind::Field => "Field",
        MemberKind::Method => "Method",
        MemberKind::Constructor => "Constructor",
        MemberKind::MessageHandler => "Handler",
    };

    let mut header = format!("{} {}", kind, flags.access().name());
    if flags.is_const() {
        header.push_str(" const");
    }
    if flags.is_static() {
        header.push_str(" static");
    }
    header.push_str(&format!(" {}", member.name));

    if flags.kind() == MemberKind::Field {
        if let Some(member_type) = &member.member_type {
            header.push_str(&format!(": {}", member_type));
        }
    } else {
        header.push_str(&format!("({})", params_text(&member.params)));
        if let Some(member_type) = &member.member_type {
            header.push_str(&format!(" -> {}", member_type));
        }
    }

    writer.line(header);
    writer.nested(|writer| {
        write_annotations(writer, &member.annotations);
        for initializer in &member.initializers {
            writer.labeled(&format!("Init {}", initializer.field), |writer| {
                write_expr(writer, &initializer.value)
            });
        }
        write_defaults(writer, &member.params);
        if let Some(body) = &member.body {
            write_block(writer, body);
        }
    });
}

fn write_object(writer: &mut TreeWriter, object: &ObjectDecl) {
    let mut header = format!("{} {}", object.kind.name(), object.name);
    if let Some(base) = &object.base_name {
        header.push_str(&format!(" : {}", base));
    }

    writer.line(header);
    writer.nested(|writer| {
        if !object.auto_accessors.is_empty() {
            writer.line(format!("AutoAccessors {}", object.auto_accessors.join(", ")));
        }
        for member in &object.members {
            write_member(writer, member);
        }
        for operator in &object.operators {
            writer.line(format!(
                "Operator {}({}) -> {}",
                operator.op,
                params_text(&operator.params),
                operator.return_type
            ));
            writer.nested(|writer| {
                write_defaults(writer, &operator.params);
                write_block(writer, &operator.body);
            });
        }
    });
}

fn template_param_text(param: &TemplateParameter) -> String {
    let dots = if param.is_variadic { "..." } else { "" };
    match param.kind {
        TemplateParameterKind::Type => format!("typename{} {}", dots, param.name),
        TemplateParameterKind::Template => format!("template typename{} {}", dots, param.name),
        TemplateParameterKind::NonType => match &param.param_type {
            Some(param_type) => format!("{}{} {}", param_type, dots, param.name),
            None => format!("dynamic{} {}", dots, param.name),
        },
    }
}

fn write_template(writer: &mut TreeWriter, template: &TemplateDecl) {
    let params: Vec<String> = template.params.iter().map(template_param_text).collect();

    writer.line(format!("Template<{}>", params.join(", ")));
    writer.nested(|writer| {
        for param in &template.params {
            match &param.default {
                Some(TemplateDefault::Type(default)) => {
                    writer.line(format!("Default {} = {}", param.name, default))
                }
                Some(TemplateDefault::Value(default)) => {
                    writer.labeled(&format!("Default {}", param.name), |writer| {
                        write_expr(writer, default)
                    })
                }
                None => {}
            }
        }
        write_stmt(writer, &template.inner);
    });
}

fn write_stmt(writer: &mut TreeWriter, stmt: &Stmt) {
    match stmt {
        Stmt::Import(import) => {
            if import.is_foreign {
                writer.line(format!("Import {} (foreign)", import.path));
            } else {
                writer.line(format!("Import {}", import.path));
            }
        }
        Stmt::VarDecl(var) => write_var_decl(writer, var),
        Stmt::MultiVarDecl(multi) => {
            writer.line("MultiVarDecl");
            writer.nested(|writer| {
                for var in &multi.vars {
                    write_var_decl(writer, var);
                }
            });
        }
        Stmt::FunctionDecl(function) => {
            write_function(writer, &format!("Function {}", function.name), function)
        }
        Stmt::ObjectDecl(object) => write_object(writer, object),
        Stmt::UnionDecl(union) => {
            let members: Vec<String> = union.member_types.iter().map(|t| t.to_string()).collect();
            writer.line(format!("Union {}: {}", union.name, members.join(" | ")));
        }
        Stmt::TemplateDecl(template) => write_template(writer, template),
        Stmt::Block(block) => write_block(writer, block),
        Stmt::If(if_stmt) => {
            writer.line("If");
            writer.nested(|writer| {
                write_expr(writer, &if_stmt.condition);
                writer.labeled("Then", |writer| write_stmt(writer, &if_stmt.then_branch));
                if let Some(else_branch) = &if_stmt.else_branch {
                    writer.labeled("Else", |writer| write_stmt(writer, else_branch));
                }
            });
        }
        Stmt::While(while_stmt) => {
            writer.line("While");
            writer.nested(|writer| {
                write_expr(writer, &while_stmt.condition);
                write_stmt(writer, &while_stmt.body);
            });
        }
        Stmt::DoWhile(do_while) => {
            writer.line("DoWhile");
            writer.nested(|writer| {
                write_stmt(writer, &do_while.body);
                write_expr(writer, &do_while.condition);
            });
        }
        Stmt::For(for_stmt) => {
            writer.line("For");
            writer.nested(|writer| {
                if let Some(init) = &for_stmt.init {
                    writer.labeled("Init", |writer| write_stmt(writer, init));
                }
                if let Some(condition) = &for_stmt.condition {
                    writer.labeled("Condition", |writer| write_expr(writer, condition));
                }
                if let Some(increment) = &for_stmt.increment {
                    writer.labeled("Increment", |writer| write_expr(writer, increment));
                }
                writer.labeled("Body", |writer| write_stmt(writer, &for_stmt.body));
            });
        }
        Stmt::Expression(expression) => {
            writer.line("ExprStmt");
            writer.nested(|writer| write_expr(writer, &expression.expression));
        }
        Stmt::Empty(_) => writer.line("Empty"),
        Stmt::Return(return_stmt) => {
            writer.line("Return");
            if let Some(value) = &return_stmt.value {
                writer.nested(|writer| write_expr(writer, value));
            }
        }
        Stmt::Unsafe(unsafe_stmt) => {
            writer.line("Unsafe");
            writer.nested(|writer| write_block(writer, &unsafe_stmt.block));
        }
        Stmt::Scope(scope) => {
            writer.line("Scope");
            writer.nested(|writer| write_block(writer, &scope.block));
        }
        Stmt::Annotation(annotation) => write_annotation(writer, annotation),
        Stmt::Error(error) => writer.line(format!("Error: {}", error.message)),
    }
}

fn write_expr(writer: &mut TreeWriter, expr: &Expr) {
    match expr {
        Expr::Literal(literal) => match literal.kind {
            LiteralKind::Number => writer.line(format!("Number {}", literal.text)),
            LiteralKind::String => writer.line(format!("String {:?}", literal.text)),
            LiteralKind::Bool => writer.line(format!("Bool {}", literal.text)),
            LiteralKind::Nil => writer.line("Nil"),
        },
        Expr::Var(var) => writer.line(format!("Var {}", var.name)),
        Expr::Binary(binary) => {
            writer.line(format!("Binary {}", binary.op.symbol()));
            writer.nested(|writer| {
                write_expr(writer, &binary.left);
                write_expr(writer, &binary.right);
            });
        }
        Expr::Unary(unary) => {
            let fixity = if unary.is_prefix { "prefix" } else { "postfix" };
            writer.line(format!("Unary {} {}", unary.op.symbol(), fixity));
            writer.nested(|writer| write_expr(writer, &unary.operand));
        }
        Expr::Call(call) => {
            writer.line("Call");
            writer.nested(|writer| {
                write_expr(writer, &call.callee);
                for arg in &call.args {
                    write_expr(writer, arg);
                }
            });
        }
        Expr::MemberAccess(member) => {
            writer.line(format!("Member {}", member.member));
            writer.nested(|writer| write_expr(writer, &member.object));
        }
        Expr::ArrayAccess(access) => {
            writer.line("Index");
            writer.nested(|writer| {
                write_expr(writer, &access.array);
                write_expr(writer, &access.index);
            });
        }
        Expr::New(new) => {
            writer.line(format!("New {}", new.class_name));
            writer.nested(|writer| {
                for arg in &new.args {
                    write_expr(writer, arg);
                }
            });
        }
        Expr::This(_) => writer.line("This"),
        Expr::FreeObject(object) => {
            writer.line("FreeObject");
            writer.nested(|writer| {
                for (name, value) in &object.properties {
                    writer.labeled(&format!("{}:", name), |writer| write_expr(writer, value));
                }
            });
        }
        Expr::TemplateString(template) => {
            writer.line("TemplateString");
            writer.nested(|writer| {
                for part in &template.parts {
                    match part {
                        TemplatePart::Text(text) => writer.line(format!("Text {:?}", text)),
                        TemplatePart::Interpolation(expr) => write_expr(writer, expr),
                    }
                }
            });
        }
        Expr::StructInitializer(initializer) => {
            if initializer.is_positional {
                writer.line("StructInit positional");
            } else {
                writer.line("StructInit");
            }
            writer.nested(|writer| {
                for (name, value) in &initializer.fields {
                    match name {
                        Some(name) => writer.labeled(&format!("{} =", name), |writer| {
                            write_expr(writer, value)
                        }),
                        None => write_expr(writer, value),
                    }
                }
            });
        }
        Expr::Lambda(lambda) => write_function(writer, "Lambda", &lambda.function),
    }
}
