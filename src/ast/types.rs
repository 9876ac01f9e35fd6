//! Type nodes of the AST.
//!
//! This module defines the types that appear in source annotations and that
//! the analyzer builds while resolving them:
//!
//! - Primitive types named by builtin keywords
//! - Named types (classes, structs, actors, unions, template parameters)
//! - Array, function and template instantiation types
//! - The `dynamic` escape hatch and the `<error>` placeholder
//!
//! Resolution never edits a type in place: the analyzer builds new values
//! and leaves the parsed annotations untouched.

use std::fmt::Display;

use crate::SourceLocation;

use super::expressions::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    Double,
    String,
    Bool,
    Number,
    BigInt,
    BigNumber,
    Short,
    Long,
    Byte,
    Void,
    Nil,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Number => "Number",
            PrimitiveKind::BigInt => "BigInt",
            PrimitiveKind::BigNumber => "BigNumber",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Nil => "nil",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int
                | PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::Number
                | PrimitiveKind::BigInt
                | PrimitiveKind::BigNumber
                | PrimitiveKind::Short
                | PrimitiveKind::Long
                | PrimitiveKind::Byte
        )
    }

    /// Rank used to pick the wider operand of an arithmetic expression.
    pub fn numeric_rank(&self) -> u8 {
        match self {
            PrimitiveKind::Byte => 1,
            PrimitiveKind::Short => 2,
            PrimitiveKind::Int => 3,
            PrimitiveKind::Long => 4,
            PrimitiveKind::Float => 5,
            PrimitiveKind::Double => 6,
            PrimitiveKind::Number => 7,
            PrimitiveKind::BigInt => 8,
            PrimitiveKind::BigNumber => 9,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub size: Option<Box<Expr>>,
    pub location: SourceLocation,
}

/// Signature of a function or lambda. Only built by the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Option<Box<Type>>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateType {
    pub base: String,
    pub args: Vec<Type>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveType),
    Named(NamedType),
    Array(ArrayType),
    Function(FunctionType),
    Template(TemplateType),
    Dynamic(SourceLocation),
    Error(SourceLocation),
}

impl Type {
    pub fn primitive(kind: PrimitiveKind, location: SourceLocation) -> Type {
        Type::Primitive(PrimitiveType { kind, location })
    }

    pub fn named(name: &str, location: SourceLocation) -> Type {
        Type::Named(NamedType {
            name: String::from(name),
            location,
        })
    }

    pub fn array(element: Type, location: SourceLocation) -> Type {
        Type::Array(ArrayType {
            element: Box::new(element),
            size: None,
            location,
        })
    }

    pub fn function(params: Vec<Type>, return_type: Option<Type>, location: SourceLocation) -> Type {
        Type::Function(FunctionType {
            params,
            return_type: return_type.map(Box::new),
            location,
        })
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Type::Primitive(primitive) => &primitive.location,
            Type::Named(named) => &named.location,
            Type::Array(array) => &array.location,
            Type::Function(function) => &function.location,
            Type::Template(template) => &template.location,
            Type::Dynamic(location) | Type::Error(location) => location,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(primitive) => Some(primitive.kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self, kind: PrimitiveKind) -> bool {
        self.as_primitive() == Some(kind)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().is_some_and(|kind| kind.is_numeric())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{}", primitive.kind.name()),
            Type::Named(named) => write!(f, "{}", named.name),
            Type::Array(array) => write!(f, "[{}]", array.element),
            Type::Function(function) => {
                let params: Vec<String> = function.params.iter().map(|param| param.to_string()).collect();
                match &function.return_type {
                    Some(return_type) => write!(f, "({}) -> {}", params.join(", "), return_type),
                    None => write!(f, "({}) -> void", params.join(", ")),
                }
            }
            Type::Template(template) => {
                let args: Vec<String> = template.args.iter().map(|arg| arg.to_string()).collect();
                write!(f, "{}<{}>", template.base, args.join(", "))
            }
            Type::Dynamic(_) => write!(f, "dynamic"),
            Type::Error(_) => write!(f, "<error>"),
        }
    }
}
