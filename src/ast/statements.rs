use std::slice::Iter;

use crate::SourceLocation;

use super::{ast::Stmt, expressions::Expr};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub increment: Option<Expr>,
    pub body: Box<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub location: SourceLocation,
}

/// `unsafe { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct UnsafeStmt {
    pub block: BlockStmt,
    pub location: SourceLocation,
}

/// `scope { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeStmt {
    pub block: BlockStmt,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationArg {
    pub name: Option<String>,
    pub value: Expr,
}

/// `@Name` or `@Name(arg, key = arg)`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<AnnotationArg>,
    pub location: SourceLocation,
}

/// Placeholder left where a statement failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStmt {
    pub message: String,
    pub location: SourceLocation,
}
