//! Declaration nodes of the AST.
//!
//! Declarations are the statements that introduce names: imports, variables,
//! functions (and lambdas), objects with their members and operator
//! overloads, unions and templates.

use crate::SourceLocation;

use super::{
    ast::Stmt,
    expressions::Expr,
    statements::{Annotation, BlockStmt},
    types::Type,
};

/// `import a.b.c;`, `import "path";` or `import java a.b;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub is_foreign: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
    /// Declared with a type: `int x`.
    Static,
    /// Declared with `let`, `var` or `dynamic`.
    Dynamic,
    /// A typed declaration initialized by `new Name(...)`.
    ClassInit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub name: String,
    pub var_type: Option<Type>,
    pub initializer: Option<Expr>,
    pub is_hoisted: bool,
    pub is_const: bool,
    pub location: SourceLocation,
}

impl VarDecl {
    /// Builds a declaration, promoting `Static` to `ClassInit` when the
    /// initializer is a constructor call.
    pub fn new(
        kind: VarDeclKind,
        name: String,
        var_type: Option<Type>,
        initializer: Option<Expr>,
        is_hoisted: bool,
        is_const: bool,
        location: SourceLocation,
    ) -> Self {
        let promoted = initializer
            .as_ref()
            .is_some_and(|initializer| initializer.is_constructor_call());
        let kind = if kind == VarDeclKind::Static && promoted {
            VarDeclKind::ClassInit
        } else {
            kind
        };

        VarDecl {
            kind,
            name,
            var_type,
            initializer,
            is_hoisted,
            is_const,
            location,
        }
    }
}

/// `int a = 1, b = 2;`
#[derive(Debug, Clone, PartialEq)]
pub struct MultiVarDecl {
    pub vars: Vec<VarDecl>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// `None` for untyped parameters, which are dynamic.
    pub param_type: Option<Type>,
    pub default_value: Option<Expr>,
    pub location: SourceLocation,
}

/// A named function, or a lambda when `name` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
    /// `None` for `extern` declarations.
    pub body: Option<BlockStmt>,
    pub is_async: bool,
    pub uses_param_struct_sugar: bool,
    pub annotations: Vec<Annotation>,
    pub location: SourceLocation,
}

impl FunctionDecl {
    pub fn is_lambda(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    MessageHandler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
    PrivateWritable,
    ProtectedWritable,
}

impl Access {
    pub fn name(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::PrivateWritable => "privatew",
            Access::ProtectedWritable => "protectedw",
        }
    }
}

/// Member kind, access, `const` and `static` packed into one byte:
/// bits 0-1 kind, bits 2-4 access, bit 5 const, bit 6 static.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFlags(u8);

impl MemberFlags {
    const KIND_MASK: u8 = 0b0000_0011;
    const ACCESS_MASK: u8 = 0b0001_1100;
    const CONST_BIT: u8 = 0b0010_0000;
    const STATIC_BIT: u8 = 0b0100_0000;

    pub fn new(kind: MemberKind, access: Access, is_const: bool, is_static: bool) -> Self {
        let kind_bits = match kind {
            MemberKind::Field => 0,
            MemberKind::Method => 1,
            MemberKind::Constructor => 2,
            MemberKind::MessageHandler => 3,
        };
        let access_bits = match access {
            Access::Public => 0,
            Access::Protected => 1,
            Access::Private => 2,
            Access::PrivateWritable => 3,
            Access::ProtectedWritable => 4,
        };

        let mut bits = kind_bits | (access_bits << 2);
        if is_const {
            bits |= Self::CONST_BIT;
        }
        if is_static {
            bits |= Self::STATIC_BIT;
        }
        MemberFlags(bits)
    }

    pub fn kind(&self) -> MemberKind {
        match self.0 & Self::KIND_MASK {
            0 => MemberKind::Field,
            1 => MemberKind::Method,
            2 => MemberKind::Constructor,
            _ => MemberKind::MessageHandler,
        }
    }

    pub fn access(&self) -> Access {
        match (self.0 & Self::ACCESS_MASK) >> 2 {
            0 => Access::Public,
            1 => Access::Protected,
            2 => Access::Private,
            3 => Access::PrivateWritable,
            _ => Access::ProtectedWritable,
        }
    }

    pub fn is_const(&self) -> bool {
        self.0 & Self::CONST_BIT != 0
    }

    pub fn is_static(&self) -> bool {
        self.0 & Self::STATIC_BIT != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// A field value (`int x = 1`) or one entry of a constructor's initializer list.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInitializer {
    pub field: String,
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub flags: MemberFlags,
    /// Field or method name, the class name for constructors, the message
    /// type for handlers.
    pub name: String,
    /// Field type, or return type of a method or handler.
    pub member_type: Option<Type>,
    pub params: Vec<Parameter>,
    pub initializers: Vec<FieldInitializer>,
    pub body: Option<BlockStmt>,
    pub annotations: Vec<Annotation>,
    pub location: SourceLocation,
}

impl MemberDecl {
    pub fn kind(&self) -> MemberKind {
        self.flags.kind()
    }
}

/// `operator + (Vec other) -> Vec { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorOverload {
    pub op: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: BlockStmt,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Class,
    Struct,
    Actor,
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Class => "Class",
            ObjectKind::Struct => "Struct",
            ObjectKind::Actor => "Actor",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDecl {
    pub kind: ObjectKind,
    pub name: String,
    pub base_name: Option<String>,
    pub members: Vec<MemberDecl>,
    pub operators: Vec<OperatorOverload>,
    /// Fields declared `privatew`/`protectedw`, which get generated accessors.
    pub auto_accessors: Vec<String>,
    pub location: SourceLocation,
}

impl ObjectDecl {
    pub fn find_member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|member| {
            member.name == name
                && matches!(member.kind(), MemberKind::Field | MemberKind::Method)
        })
    }

    pub fn constructor(&self) -> Option<&MemberDecl> {
        self.members
            .iter()
            .find(|member| member.kind() == MemberKind::Constructor)
    }

    pub fn fields(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members
            .iter()
            .filter(|member| member.kind() == MemberKind::Field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDecl {
    pub name: String,
    pub member_types: Vec<Type>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateParameterKind {
    /// `typename T`
    Type,
    /// `int N`
    NonType,
    /// `template <...> typename C`
    Template,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDefault {
    Type(Type),
    Value(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub kind: TemplateParameterKind,
    pub name: String,
    pub is_variadic: bool,
    /// Declared type of a non-type parameter.
    pub param_type: Option<Type>,
    pub default: Option<TemplateDefault>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl {
    pub params: Vec<TemplateParameter>,
    pub inner: Box<Stmt>,
    pub location: SourceLocation,
}
