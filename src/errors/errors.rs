use std::fmt::Display;

use thiserror::Error;

use crate::SourceLocation;

use super::diagnostics::Severity;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    location: SourceLocation,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, location: SourceLocation) -> Self {
        Error {
            internal_error: error_impl,
            location,
        }
    }

    pub fn get_location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_severity(&self) -> Severity {
        self.internal_error.severity()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnterminatedTemplate => "UnterminatedTemplate",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnexpectedTopLevelToken { .. } => "UnexpectedTopLevelToken",
            ErrorImpl::UnclosedBlock { .. } => "UnclosedBlock",
            ErrorImpl::BracesRequired { .. } => "BracesRequired",
            ErrorImpl::MisplacedAnnotations => "MisplacedAnnotations",
            ErrorImpl::AnnotationsNotAllowed { .. } => "AnnotationsNotAllowed",
            ErrorImpl::MissingOperatorReturnType { .. } => "MissingOperatorReturnType",
            ErrorImpl::MessageHandlerOutsideActor => "MessageHandlerOutsideActor",
            ErrorImpl::Redeclaration { .. } => "Redeclaration",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::NotAType { .. } => "NotAType",
            ErrorImpl::UnknownBaseClass { .. } => "UnknownBaseClass",
            ErrorImpl::InitializerTypeMismatch { .. } => "InitializerTypeMismatch",
            ErrorImpl::DynamicTypeConflict { .. } => "DynamicTypeConflict",
            ErrorImpl::MissingTypeOrInitializer { .. } => "MissingTypeOrInitializer",
            ErrorImpl::ConstWithoutInitializer { .. } => "ConstWithoutInitializer",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::BinaryOperandMismatch { .. } => "BinaryOperandMismatch",
            ErrorImpl::NonNumericOperand { .. } => "NonNumericOperand",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::ReturnValueFromVoid => "ReturnValueFromVoid",
            ErrorImpl::LambdaReturnTypeRequired => "LambdaReturnTypeRequired",
            ErrorImpl::DefaultValueTypeMismatch { .. } => "DefaultValueTypeMismatch",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::FieldTypeMatchError { .. } => "FieldTypeMatchError",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::TooManyPositionalFields { .. } => "TooManyPositionalFields",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::IndexNotInt { .. } => "IndexNotInt",
            ErrorImpl::ConditionNotBool { .. } => "ConditionNotBool",
            ErrorImpl::ThisOutsideObject => "ThisOutsideObject",
            ErrorImpl::DynamicUnionMember { .. } => "DynamicUnionMember",
            ErrorImpl::RecursiveUnion { .. } => "RecursiveUnion",
            ErrorImpl::InheritanceCycle { .. } => "InheritanceCycle",
            ErrorImpl::NotAnObject { .. } => "NotAnObject",
            ErrorImpl::ImportNotResolved { .. } => "ImportNotResolved",
            ErrorImpl::ScopeUnderflow => "ScopeUnderflow",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnclosedBlock { opened_line } => ErrorTip::Suggestion(format!(
                "Add a `}}` for the block opened on line {}",
                opened_line
            )),
            ErrorImpl::BracesRequired { construct } => ErrorTip::Suggestion(format!(
                "Wrap the body of `{}` in braces, or pass `--braces optional`",
                construct
            )),
            ErrorImpl::Redeclaration { name, .. } => ErrorTip::Suggestion(format!(
                "Rename one of the declarations of `{}`",
                name
            )),
            ErrorImpl::UndeclaredIdentifier { name } => ErrorTip::Suggestion(format!(
                "Declare `{}` before using it",
                name
            )),
            ErrorImpl::DynamicTypeConflict { .. } => ErrorTip::Suggestion(String::from(
                "Drop the type annotation, or declare the variable with its type instead of `let`/`var`/`dynamic`",
            )),
            ErrorImpl::LambdaReturnTypeRequired => ErrorTip::Suggestion(String::from(
                "Write the return type after the parameters: `(a, b) -> int => a + b`",
            )),
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ScopeUnderflow => ErrorTip::Suggestion(String::from(
                "This is a bug in the analyzer, not in the program being checked",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unterminated template string")]
    UnterminatedTemplate,

    // Syntax
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unexpected token at top level: {token:?}")]
    UnexpectedTopLevelToken { token: String },
    #[error("expected '}}' to close the block opened on line {opened_line}")]
    UnclosedBlock { opened_line: u32 },
    #[error("expected '{{' after '{construct}' (braces are required)")]
    BracesRequired { construct: String },
    #[error("annotations must precede a declaration")]
    MisplacedAnnotations,
    #[error("annotations cannot be attached to {declaration}")]
    AnnotationsNotAllowed { declaration: String },
    #[error("operator overload '{operator}' needs a return type")]
    MissingOperatorReturnType { operator: String },
    #[error("message handlers are only allowed inside actors")]
    MessageHandlerOutsideActor,

    // Semantic
    #[error("redeclaration of '{name}', previously declared at line {previous_line}")]
    Redeclaration { name: String, previous_line: u32 },
    #[error("undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String },
    #[error("unknown type '{type_}'")]
    UnknownType { type_: String },
    #[error("'{name}' does not name a type")]
    NotAType { name: String },
    #[error("base class '{name}' not found")]
    UnknownBaseClass { name: String },
    #[error("initializer type '{received}' is not compatible with declared type '{expected}'")]
    InitializerTypeMismatch { expected: String, received: String },
    #[error("explicit type '{type_}' conflicts with the dynamic declaration of '{name}'")]
    DynamicTypeConflict { name: String, type_: String },
    #[error("variable '{name}' must have a type or an initializer")]
    MissingTypeOrInitializer { name: String },
    #[error("constant '{name}' must be initialized")]
    ConstWithoutInitializer { name: String },
    #[error("type mismatch in assignment: cannot assign '{value}' to '{target}'")]
    AssignmentTypeMismatch { target: String, value: String },
    #[error("type mismatch in binary operation: '{left}' {operator} '{right}'")]
    BinaryOperandMismatch {
        operator: String,
        left: String,
        right: String,
    },
    #[error("operator '{operator}' needs a numeric operand, found '{type_}'")]
    NonNumericOperand { operator: String, type_: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("cannot assign to constant '{name}'")]
    AssignToConstant { name: String },
    #[error("'return' statement outside of function")]
    ReturnOutsideFunction,
    #[error("return type '{received}' is not compatible with the function's return type '{expected}'")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("must return a value from a function returning '{expected}'")]
    MissingReturnValue { expected: String },
    #[error("cannot return a value from a void function")]
    ReturnValueFromVoid,
    #[error("lambda return type inference is not supported, an explicit return type is required")]
    LambdaReturnTypeRequired,
    #[error("default value of '{parameter}' has type '{received}', expected '{expected}'")]
    DefaultValueTypeMismatch {
        parameter: String,
        expected: String,
        received: String,
    },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument types do not match: expected '{expected}', received '{received}'")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("field types do not match: expected '{expected}', received '{received}'")]
    FieldTypeMatchError { expected: String, received: String },
    #[error("'{type_}' has no field '{field}'")]
    UnknownField { type_: String, field: String },
    #[error("'{type_}' declares {expected} fields but {received} values were given")]
    TooManyPositionalFields {
        type_: String,
        expected: usize,
        received: usize,
    },
    #[error("type '{type_}' is not callable")]
    NotCallable { type_: String },
    #[error("type '{type_}' has no member '{member}'")]
    UnknownMember { type_: String, member: String },
    #[error("type '{type_}' cannot be indexed")]
    NotIndexable { type_: String },
    #[error("array index must be 'int', found '{received}'")]
    IndexNotInt { received: String },
    #[error("condition must be 'bool', found '{received}'")]
    ConditionNotBool { received: String },
    #[error("'this' used outside of an object body")]
    ThisOutsideObject,
    #[error("union '{union}' cannot contain a dynamic member type")]
    DynamicUnionMember { union: String },
    #[error("union '{union}' contains itself")]
    RecursiveUnion { union: String },
    #[error("'{name}' inherits from itself")]
    InheritanceCycle { name: String },
    #[error("'{name}' is not a class, struct or actor")]
    NotAnObject { name: String },
    #[error("import '{path}' is not resolved, names it provides stay undeclared")]
    ImportNotResolved { path: String },

    // Internal
    #[error("exiting non-existent scope")]
    ScopeUnderflow,
}

impl ErrorImpl {
    pub fn severity(&self) -> Severity {
        match self {
            ErrorImpl::ImportNotResolved { .. } => Severity::Warning,
            ErrorImpl::ScopeUnderflow => Severity::InternalError,
            _ => Severity::Error,
        }
    }
}
