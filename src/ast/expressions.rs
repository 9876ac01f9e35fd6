use crate::SourceLocation;

use super::declarations::FunctionDecl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Bool,
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub text: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarExpr {
    pub name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::Neq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gte => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Assign => "=",
            BinaryOperator::AddAssign => "+=",
            BinaryOperator::SubAssign => "-=",
            BinaryOperator::MulAssign => "*=",
            BinaryOperator::DivAssign => "/=",
            BinaryOperator::ModAssign => "%=",
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Assign
                | BinaryOperator::AddAssign
                | BinaryOperator::SubAssign
                | BinaryOperator::MulAssign
                | BinaryOperator::DivAssign
                | BinaryOperator::ModAssign
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Neq
                | BinaryOperator::Lt
                | BinaryOperator::Gt
                | BinaryOperator::Lte
                | BinaryOperator::Gte
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Inc,
    Dec,
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Inc => "++",
            UnaryOperator::Dec => "--",
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOperator,
    pub operand: Box<Expr>,
    pub is_prefix: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccessExpr {
    pub object: Box<Expr>,
    pub member: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub class_name: String,
    pub args: Vec<Expr>,
    pub location: SourceLocation,
}

/// `freeobj { name: value, ... }`, an ad-hoc map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeObjectExpr {
    pub properties: Vec<(String, Expr)>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Interpolation(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStringExpr {
    pub parts: Vec<TemplatePart>,
    pub location: SourceLocation,
}

/// Field-by-name (`.x = 1`, `x: 1`) or positional (`1`) aggregate literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInitializerExpr {
    pub fields: Vec<(Option<String>, Expr)>,
    pub is_positional: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub function: FunctionDecl,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Var(VarExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    MemberAccess(MemberAccessExpr),
    ArrayAccess(ArrayAccessExpr),
    New(NewExpr),
    This(SourceLocation),
    FreeObject(FreeObjectExpr),
    TemplateString(TemplateStringExpr),
    StructInitializer(StructInitializerExpr),
    Lambda(LambdaExpr),
}

impl Expr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::Literal(literal) => &literal.location,
            Expr::Var(var) => &var.location,
            Expr::Binary(binary) => &binary.location,
            Expr::Unary(unary) => &unary.location,
            Expr::Call(call) => &call.location,
            Expr::MemberAccess(member) => &member.location,
            Expr::ArrayAccess(access) => &access.location,
            Expr::New(new) => &new.location,
            Expr::This(location) => location,
            Expr::FreeObject(object) => &object.location,
            Expr::TemplateString(template) => &template.location,
            Expr::StructInitializer(initializer) => &initializer.location,
            Expr::Lambda(lambda) => &lambda.location,
        }
    }

    /// True for `new Name(...)`, which turns a typed declaration into a class-init.
    pub fn is_constructor_call(&self) -> bool {
        matches!(self, Expr::New(_))
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expr::Var(_) | Expr::MemberAccess(_) | Expr::ArrayAccess(_)
        )
    }
}
