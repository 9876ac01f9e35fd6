//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Builtin primitive keywords
//! - Named types and template instantiations (`Name<T, U>`)
//! - Array types, optionally sized (`[T]`, `[T; n]`)
//! - `dynamic` and `freeobj`, which are both dynamic
//!
//! Type parsing never reports diagnostics itself, so the parser can use it
//! tentatively and rewind on failure.

use std::collections::HashMap;

use crate::{
    ast::types::{ArrayType, PrimitiveKind, TemplateType, Type},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expr, lookups::BindingPower, parser::Parser};

/// Type alias for type handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    for kind in [
        TokenKind::IntType,
        TokenKind::LongType,
        TokenKind::ShortType,
        TokenKind::ByteType,
        TokenKind::FloatType,
        TokenKind::DoubleType,
        TokenKind::StringType,
        TokenKind::BoolType,
        TokenKind::VoidType,
        TokenKind::NumberType,
        TokenKind::BigIntType,
        TokenKind::BigNumberType,
    ] {
        parser.type_nud(kind, parse_primitive_type);
    }

    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
    parser.type_nud(TokenKind::Dynamic, parse_dynamic_type);
    parser.type_nud(TokenKind::FreeObj, parse_dynamic_type);
}

fn primitive_kind(kind: TokenKind) -> Option<PrimitiveKind> {
    let primitive = match kind {
        TokenKind::IntType => PrimitiveKind::Int,
        TokenKind::LongType => PrimitiveKind::Long,
        TokenKind::ShortType => PrimitiveKind::Short,
        TokenKind::ByteType => PrimitiveKind::Byte,
        TokenKind::FloatType => PrimitiveKind::Float,
        TokenKind::DoubleType => PrimitiveKind::Double,
        TokenKind::StringType => PrimitiveKind::String,
        TokenKind::BoolType => PrimitiveKind::Bool,
        TokenKind::VoidType => PrimitiveKind::Void,
        TokenKind::NumberType => PrimitiveKind::Number,
        TokenKind::BigIntType => PrimitiveKind::BigInt,
        TokenKind::BigNumberType => PrimitiveKind::BigNumber,
        _ => return None,
    };
    Some(primitive)
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let kind = primitive_kind(parser.current_token_kind()).ok_or_else(|| parser.unexpected())?;
    let token = parser.advance();
    Ok(Type::primitive(kind, token.location.clone()))
}

pub fn parse_dynamic_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.advance();
    Ok(Type::Dynamic(token.location.clone()))
}

/// `Name`, or `Name<T, ...>` when `<` is not itself followed by `<`.
pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    if parser.current_token_kind() != TokenKind::Less || parser.peek_kind(1) == TokenKind::Less {
        return Ok(Type::named(&token.value, token.location));
    }

    parser.advance();
    let mut args = vec![parse_type(parser)?];
    while parser.eat(TokenKind::Comma) {
        args.push(parse_type(parser)?);
    }
    let close = parser.expect_message(TokenKind::Greater, "expected '>' after template arguments")?;

    Ok(Type::Template(TemplateType {
        base: token.value,
        args,
        location: token.location.to(&close.location),
    }))
}

/// `[T]` or `[T; size]`
pub fn parse_array_type(parser: &mut Parser) -> Result<Type, Error> {
    let open = parser.expect(TokenKind::OpenBracket)?;
    let element = parse_type(parser)?;

    let size = if parser.eat(TokenKind::Semicolon) {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else {
        None
    };
    let close = parser.expect_message(TokenKind::CloseBracket, "expected ']' after array type")?;

    Ok(Type::Array(ArrayType {
        element: Box::new(element),
        size,
        location: open.location.to(&close.location),
    }))
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let handler = parser
        .get_type_nud_handler(parser.current_token_kind())
        .ok_or_else(|| parser.unexpected())?;
    handler(parser)
}

/// True when the current token can begin a type.
pub fn starts_type(parser: &Parser) -> bool {
    parser
        .get_type_nud_handler(parser.current_token_kind())
        .is_some()
}
