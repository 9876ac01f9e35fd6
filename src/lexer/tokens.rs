use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::SourceLocation;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("var", TokenKind::Var);
        map.insert("fun", TokenKind::Fun);
        map.insert("unsafe", TokenKind::Unsafe);
        map.insert("class", TokenKind::Class);
        map.insert("struct", TokenKind::Struct);
        map.insert("union", TokenKind::Union);
        map.insert("actor", TokenKind::Actor);
        map.insert("on", TokenKind::On);
        map.insert("scope", TokenKind::Scope);
        map.insert("new", TokenKind::New);
        map.insert("hoist", TokenKind::Hoist);
        map.insert("public", TokenKind::Public);
        map.insert("private", TokenKind::Private);
        map.insert("protected", TokenKind::Protected);
        map.insert("privatew", TokenKind::PrivateW);
        map.insert("protectedw", TokenKind::ProtectedW);
        map.insert("static", TokenKind::Static);
        map.insert("const", TokenKind::Const);
        map.insert("import", TokenKind::Import);
        map.insert("package", TokenKind::Package);
        map.insert("extern", TokenKind::Extern);
        map.insert("java", TokenKind::Java);
        map.insert("template", TokenKind::Template);
        map.insert("typename", TokenKind::Typename);
        map.insert("operator", TokenKind::Operator);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("while", TokenKind::While);
        map.insert("do", TokenKind::Do);
        map.insert("return", TokenKind::Return);
        map.insert("this", TokenKind::This);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("null", TokenKind::Null);
        map.insert("int", TokenKind::IntType);
        map.insert("long", TokenKind::LongType);
        map.insert("short", TokenKind::ShortType);
        map.insert("byte", TokenKind::ByteType);
        map.insert("float", TokenKind::FloatType);
        map.insert("double", TokenKind::DoubleType);
        map.insert("string", TokenKind::StringType);
        map.insert("bool", TokenKind::BoolType);
        map.insert("void", TokenKind::VoidType);
        map.insert("Number", TokenKind::NumberType);
        map.insert("BigInt", TokenKind::BigIntType);
        map.insert("BigNumber", TokenKind::BigNumberType);
        map.insert("dynamic", TokenKind::Dynamic);
        map.insert("freeobj", TokenKind::FreeObj);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    // Template strings: `text ${expr} text`
    Backtick,
    TemplatePart,
    DollarCurly,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Dot,
    Ellipsis,
    Semicolon,
    Colon,
    Comma,
    At,
    Arrow,       // ->
    LambdaArrow, // =>

    PlusPlus,
    MinusMinus,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Let,
    Var,
    Fun,
    Unsafe,
    Class,
    Struct,
    Union,
    Actor,
    On,
    Scope,
    New,
    Hoist,
    Public,
    Private,
    Protected,
    PrivateW,
    ProtectedW,
    Static,
    Const,
    Import,
    Package,
    Extern,
    Java,
    Template,
    Typename,
    Operator,
    If,
    Else,
    For,
    While,
    Do,
    Return,
    This,
    True,
    False,
    Null,

    // Builtin types
    IntType,
    LongType,
    ShortType,
    ByteType,
    FloatType,
    DoubleType,
    StringType,
    BoolType,
    VoidType,
    NumberType,
    BigIntType,
    BigNumberType,
    Dynamic,
    FreeObj,
}

impl TokenKind {
    /// Keywords that name a primitive type.
    pub fn is_builtin_type(&self) -> bool {
        matches!(
            self,
            TokenKind::IntType
                | TokenKind::LongType
                | TokenKind::ShortType
                | TokenKind::ByteType
                | TokenKind::FloatType
                | TokenKind::DoubleType
                | TokenKind::StringType
                | TokenKind::BoolType
                | TokenKind::VoidType
                | TokenKind::NumberType
                | TokenKind::BigIntType
                | TokenKind::BigNumberType
        )
    }

    pub fn is_access_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::PrivateW
                | TokenKind::ProtectedW
        )
    }

    /// `let`, `var` and `dynamic` introduce dynamically typed declarations.
    pub fn is_dynamic_declarator(&self) -> bool {
        matches!(self, TokenKind::Let | TokenKind::Var | TokenKind::Dynamic)
    }

    /// Tokens that only make sense at the start of a top-level declaration.
    pub fn is_top_level_only(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Actor
                | TokenKind::Fun
                | TokenKind::Import
                | TokenKind::Template
                | TokenKind::Package
                | TokenKind::Extern
        )
    }

    /// Tokens at which error recovery may resume parsing.
    pub fn starts_construct(&self) -> bool {
        self.is_top_level_only()
            || self.is_access_modifier()
            || self.is_dynamic_declarator()
            || matches!(
                self,
                TokenKind::If
                    | TokenKind::While
                    | TokenKind::For
                    | TokenKind::Do
                    | TokenKind::Return
                    | TokenKind::Unsafe
                    | TokenKind::Scope
                    | TokenKind::At
            )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: SourceLocation,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    pub fn debug(&self) -> String {
        if self.is_one_of(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::TemplatePart,
        ]) {
            format!("{} ({})", self.kind, self.value)
        } else {
            format!("{} ()", self.kind)
        }
    }
}
