use std::rc::Rc;

use crate::SourceLocation;

use super::{
    declarations::{
        FunctionDecl, ImportDecl, MultiVarDecl, ObjectDecl, TemplateDecl, UnionDecl, VarDecl,
    },
    statements::{
        Annotation, BlockStmt, DoWhileStmt, ErrorStmt, ExpressionStmt, ForStmt, IfStmt,
        ReturnStmt, ScopeStmt, UnsafeStmt, WhileStmt,
    },
};

/// Root of a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub declarations: Vec<Stmt>,
    pub location: SourceLocation,
}

impl Program {
    pub fn empty(file: Rc<String>) -> Self {
        Program {
            declarations: vec![],
            location: SourceLocation::new(1, 1, 0, file),
        }
    }
}

/// Every declaration and statement form.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportDecl),
    VarDecl(VarDecl),
    MultiVarDecl(MultiVarDecl),
    FunctionDecl(FunctionDecl),
    ObjectDecl(ObjectDecl),
    UnionDecl(UnionDecl),
    TemplateDecl(TemplateDecl),

    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Expression(ExpressionStmt),
    Empty(SourceLocation),
    Return(ReturnStmt),
    Unsafe(UnsafeStmt),
    Scope(ScopeStmt),
    Annotation(Annotation),
    Error(ErrorStmt),
}

impl Stmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Stmt::Import(import) => &import.location,
            Stmt::VarDecl(var) => &var.location,
            Stmt::MultiVarDecl(multi) => &multi.location,
            Stmt::FunctionDecl(function) => &function.location,
            Stmt::ObjectDecl(object) => &object.location,
            Stmt::UnionDecl(union) => &union.location,
            Stmt::TemplateDecl(template) => &template.location,
            Stmt::Block(block) => &block.location,
            Stmt::If(if_stmt) => &if_stmt.location,
            Stmt::While(while_stmt) => &while_stmt.location,
            Stmt::DoWhile(do_while) => &do_while.location,
            Stmt::For(for_stmt) => &for_stmt.location,
            Stmt::Expression(expression) => &expression.location,
            Stmt::Empty(location) => location,
            Stmt::Return(return_stmt) => &return_stmt.location,
            Stmt::Unsafe(unsafe_stmt) => &unsafe_stmt.location,
            Stmt::Scope(scope) => &scope.location,
            Stmt::Annotation(annotation) => &annotation.location,
            Stmt::Error(error) => &error.location,
        }
    }

    /// Human-readable name of the construct, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Stmt::Import(_) => "an import",
            Stmt::VarDecl(_) | Stmt::MultiVarDecl(_) => "a variable declaration",
            Stmt::FunctionDecl(_) => "a function",
            Stmt::ObjectDecl(object) => match object.kind {
                super::declarations::ObjectKind::Class => "a class",
                super::declarations::ObjectKind::Struct => "a struct",
                super::declarations::ObjectKind::Actor => "an actor",
            },
            Stmt::UnionDecl(_) => "a union",
            Stmt::TemplateDecl(_) => "a template",
            _ => "a statement",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Stmt::Error(_))
    }
}
