//! Declaration parsing.
//!
//! This module parses everything that can appear at the top level:
//! imports, functions (including `extern` and C-style signatures),
//! classes, structs, actors and their members, unions and templates.
//! Anything else that starts a statement is parsed as a script-style
//! statement.
//!
//! Annotations are parsed first and handed explicitly to the declaration
//! that follows. Only functions and object members accept them.

use crate::{
    ast::{
        ast::Stmt,
        declarations::{
            Access, FieldInitializer, FunctionDecl, ImportDecl, MemberDecl, MemberFlags,
            MemberKind, ObjectDecl, ObjectKind, OperatorOverload, Parameter, TemplateDecl,
            TemplateDefault, TemplateParameter, TemplateParameterKind, UnionDecl,
        },
        statements::{Annotation, AnnotationArg},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    SourceLocation,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_block, parse_stmt, starts_typed_declaration},
    types::{parse_type, starts_type},
};

/// Parses one top-level item. Returns `None` when the input was skipped.
pub fn parse_top_level(parser: &mut Parser) -> Result<Option<Stmt>, Error> {
    let annotations = parse_annotations(parser)?;

    if let Some(first) = annotations.first() {
        if !parser.has_tokens() {
            parser.report(Error::new(
                ErrorImpl::MisplacedAnnotations,
                first.location.clone(),
            ));
            return Ok(None);
        }
    }

    parse_declaration(parser, annotations)
}

fn parse_declaration(
    parser: &mut Parser,
    annotations: Vec<Annotation>,
) -> Result<Option<Stmt>, Error> {
    let kind = parser.current_token_kind();

    let stmt = match kind {
        TokenKind::Fun => {
            let function = parse_function_decl(parser, annotations, false)?;
            return Ok(Some(Stmt::FunctionDecl(function)));
        }
        TokenKind::Extern => {
            parser.advance();
            let function = if parser.current_token_kind() == TokenKind::Fun {
                parse_function_decl(parser, annotations, true)?
            } else {
                let return_type = parse_type(parser)?;
                parse_function_rest(parser, Some(return_type), annotations, true)?
            };
            return Ok(Some(Stmt::FunctionDecl(function)));
        }
        TokenKind::Template => return Ok(Some(parse_template_decl(parser, annotations)?)),
        TokenKind::Package => {
            return Err(parser.error_here(ErrorImpl::UnexpectedTopLevelToken {
                token: parser.current_token().value.clone(),
            }))
        }
        TokenKind::Import => parse_import_decl(parser)?,
        TokenKind::Class | TokenKind::Struct | TokenKind::Actor => parse_object_decl(parser)?,
        TokenKind::Union => parse_union_decl(parser)?,
        _ => {
            if starts_c_style_function(parser) {
                let return_type = parse_type(parser)?;
                let function = parse_function_rest(parser, Some(return_type), annotations, false)?;
                return Ok(Some(Stmt::FunctionDecl(function)));
            }

            let starts_stmt = parser.get_stmt_handler(kind).is_some()
                || parser.get_nud_handler(kind).is_some()
                || starts_typed_declaration(parser);
            if !starts_stmt {
                let error = parser.error_here(ErrorImpl::UnexpectedTopLevelToken {
                    token: parser.current_token().value.clone(),
                });
                parser.report(error);
                parser.advance();
                return Ok(None);
            }

            parse_stmt(parser)?
        }
    };

    if let Some(first) = annotations.first() {
        parser.report(Error::new(
            ErrorImpl::AnnotationsNotAllowed {
                declaration: String::from(stmt.describe()),
            },
            first.location.clone(),
        ));
    }

    Ok(Some(stmt))
}

/// `Type name(` opens a C-style function. The cursor is left where it was.
fn starts_c_style_function(parser: &mut Parser) -> bool {
    if !starts_type(parser) {
        return false;
    }

    let start = parser.position();
    let is_function = parse_type(parser).is_ok()
        && parser.current_token_kind() == TokenKind::Identifier
        && parser.peek_kind(1) == TokenKind::OpenParen;
    parser.rewind(start);
    is_function
}

fn starts_declaration(parser: &mut Parser) -> bool {
    matches!(
        parser.current_token_kind(),
        TokenKind::Class
            | TokenKind::Struct
            | TokenKind::Actor
            | TokenKind::Union
            | TokenKind::Fun
            | TokenKind::Extern
            | TokenKind::Template
    ) || starts_c_style_function(parser)
}

pub fn parse_annotations(parser: &mut Parser) -> Result<Vec<Annotation>, Error> {
    let mut annotations = vec![];
    while parser.current_token_kind() == TokenKind::At {
        annotations.push(parse_annotation(parser)?);
    }
    Ok(annotations)
}

/// `@Name` or `@Name(expr, key = expr, ...)`
pub fn parse_annotation(parser: &mut Parser) -> Result<Annotation, Error> {
    let at = parser.expect(TokenKind::At)?;
    let name = parser.expect_message(TokenKind::Identifier, "expected annotation name after '@'")?;
    let mut args = vec![];

    if parser.eat(TokenKind::OpenParen) {
        while parser.current_token_kind() != TokenKind::CloseParen {
            let arg_name = if parser.current_token_kind() == TokenKind::Identifier
                && parser.peek_kind(1) == TokenKind::Assignment
            {
                let arg_name = parser.advance().value.clone();
                parser.advance();
                Some(arg_name)
            } else {
                None
            };

            args.push(AnnotationArg {
                name: arg_name,
                value: parse_expr(parser, BindingPower::Default)?,
            });

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
        parser.expect_message(TokenKind::CloseParen, "expected ')' after annotation arguments")?;
    }

    Ok(Annotation {
        name: name.value,
        args,
        location: at.location.to(&name.location),
    })
}

/// `import a.b.c;`, `import "path";`, `import java a.b;`
fn parse_import_decl(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();
    let is_foreign = parser.eat(TokenKind::Java);

    let path = if parser.current_token_kind() == TokenKind::String {
        parser.advance().value.clone()
    } else {
        let mut path = parser
            .expect_message(TokenKind::Identifier, "expected module path after 'import'")?
            .value;
        while parser.eat(TokenKind::Dot) {
            let segment =
                parser.expect_message(TokenKind::Identifier, "expected identifier in module path")?;
            path.push('.');
            path.push_str(&segment.value);
        }
        path
    };

    parser.eat(TokenKind::Semicolon);

    Ok(Stmt::Import(ImportDecl {
        path,
        is_foreign,
        location,
    }))
}

/// `fun [RetType] name(params) [-> RetType] block`
fn parse_function_decl(
    parser: &mut Parser,
    annotations: Vec<Annotation>,
    is_extern: bool,
) -> Result<FunctionDecl, Error> {
    parser.expect(TokenKind::Fun)?;

    let return_type = if parser.current_token_kind() == TokenKind::Identifier
        && parser.peek_kind(1) == TokenKind::OpenParen
    {
        None
    } else {
        Some(parse_type(parser)?)
    };

    parse_function_rest(parser, return_type, annotations, is_extern)
}

/// Everything after the return type: `name(params) [-> RetType] (block | ;)`.
fn parse_function_rest(
    parser: &mut Parser,
    return_type: Option<Type>,
    annotations: Vec<Annotation>,
    is_extern: bool,
) -> Result<FunctionDecl, Error> {
    let name = parser.expect_message(TokenKind::Identifier, "expected function name")?;
    let (params, uses_param_struct_sugar) = parse_params(parser)?;

    let return_type = if parser.eat(TokenKind::Arrow) {
        Some(parse_type(parser)?)
    } else {
        return_type
    };

    let body = if is_extern {
        parser.expect_message(TokenKind::Semicolon, "expected ';' after extern declaration")?;
        None
    } else {
        Some(parse_block(parser)?)
    };

    let is_async = annotations
        .iter()
        .any(|annotation| annotation.name == "Async");

    Ok(FunctionDecl {
        name: name.value,
        params,
        return_type,
        body,
        is_async,
        uses_param_struct_sugar,
        annotations,
        location: name.location,
    })
}

/// `(param, ...)` or the struct sugar form `({param, ...})`.
///
/// Reports nothing itself, so lambdas can try it tentatively.
pub fn parse_params(parser: &mut Parser) -> Result<(Vec<Parameter>, bool), Error> {
    parser.expect_message(TokenKind::OpenParen, "expected '(' before parameters")?;
    let uses_sugar = parser.eat(TokenKind::OpenCurly);
    let closing = if uses_sugar {
        TokenKind::CloseCurly
    } else {
        TokenKind::CloseParen
    };

    let mut params = vec![];
    while parser.current_token_kind() != closing {
        params.push(parse_param(parser)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    if uses_sugar {
        parser.expect_message(TokenKind::CloseCurly, "expected '}' after parameters")?;
    }
    parser.expect_message(TokenKind::CloseParen, "expected ')' after parameters")?;

    Ok((params, uses_sugar))
}

/// `Type name`, `let|var|dynamic name` or `name`, each with an optional default.
fn parse_param(parser: &mut Parser) -> Result<Parameter, Error> {
    let kind = parser.current_token_kind();

    let param_type = if kind.is_dynamic_declarator() && parser.peek_kind(1) == TokenKind::Identifier {
        parser.advance();
        None
    } else if kind == TokenKind::Identifier
        && matches!(
            parser.peek_kind(1),
            TokenKind::Comma | TokenKind::CloseParen | TokenKind::CloseCurly | TokenKind::Assignment
        )
    {
        None
    } else {
        Some(parse_type(parser)?)
    };

    let name = parser.expect_message(TokenKind::Identifier, "expected parameter name")?;

    let default_value = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Parameter {
        name: name.value,
        param_type,
        default_value,
        location: name.location,
    })
}

enum ParsedMember {
    Member(MemberDecl),
    Operator(OperatorOverload),
}

/// `class|struct|actor Name [: Base] { members }`
fn parse_object_decl(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = match parser.advance().kind {
        TokenKind::Class => ObjectKind::Class,
        TokenKind::Struct => ObjectKind::Struct,
        _ => ObjectKind::Actor,
    };
    let name = parser.expect_message(TokenKind::Identifier, "expected type name")?;

    let base_name = if parser.eat(TokenKind::Colon) {
        Some(
            parser
                .expect_message(TokenKind::Identifier, "expected base class name after ':'")?
                .value,
        )
    } else {
        None
    };

    let open = parser.expect_message(TokenKind::OpenCurly, "expected '{' to open the body")?;
    let default_access = if kind == ObjectKind::Struct {
        Access::Public
    } else {
        Access::Private
    };

    let mut members = vec![];
    let mut operators = vec![];

    loop {
        let current = parser.current_token_kind();
        if current == TokenKind::CloseCurly {
            parser.advance();
            break;
        }
        if current == TokenKind::EOF || (current.is_top_level_only() && current != TokenKind::Fun) {
            let error = parser.error_here(ErrorImpl::UnclosedBlock {
                opened_line: open.location.line,
            });
            parser.report(error);
            break;
        }

        let start = parser.position();
        match parse_member(parser, kind, &name.value, default_access) {
            Ok(ParsedMember::Member(member)) => members.push(member),
            Ok(ParsedMember::Operator(operator)) => operators.push(operator),
            Err(error) => {
                parser.report(error);
                parser.synchronize_in_block();
            }
        }

        if parser.position() == start {
            parser.advance();
        }
    }

    parser.eat(TokenKind::Semicolon);

    let auto_accessors = members
        .iter()
        .filter(|member| {
            member.kind() == MemberKind::Field
                && matches!(
                    member.flags.access(),
                    Access::PrivateWritable | Access::ProtectedWritable
                )
        })
        .map(|member| member.name.clone())
        .collect();

    Ok(Stmt::ObjectDecl(ObjectDecl {
        kind,
        name: name.value,
        base_name,
        members,
        operators,
        auto_accessors,
        location: name.location,
    }))
}

fn parse_access(parser: &mut Parser, default_access: Access) -> Access {
    let access = match parser.current_token_kind() {
        TokenKind::Public => Access::Public,
        TokenKind::Protected => Access::Protected,
        TokenKind::Private => Access::Private,
        TokenKind::PrivateW => Access::PrivateWritable,
        TokenKind::ProtectedW => Access::ProtectedWritable,
        _ => return default_access,
    };
    parser.advance();
    access
}

fn parse_member(
    parser: &mut Parser,
    object_kind: ObjectKind,
    object_name: &str,
    default_access: Access,
) -> Result<ParsedMember, Error> {
    let annotations = parse_annotations(parser)?;
    let access = parse_access(parser, default_access);

    let mut is_const = false;
    let mut is_static = false;
    loop {
        match parser.current_token_kind() {
            TokenKind::Const => is_const = true,
            TokenKind::Static => is_static = true,
            _ => break,
        }
        parser.advance();
    }
    let flags = |kind: MemberKind| MemberFlags::new(kind, access, is_const, is_static);

    match parser.current_token_kind() {
        TokenKind::On => {
            if object_kind != ObjectKind::Actor {
                return Err(parser.error_here(ErrorImpl::MessageHandlerOutsideActor));
            }
            parser.advance();

            let message = parser.expect_message(TokenKind::Identifier, "expected message type after 'on'")?;
            let (params, _) = parse_params(parser)?;
            let member_type = if parser.eat(TokenKind::Arrow) {
                Some(parse_type(parser)?)
            } else {
                None
            };
            let body = parse_block(parser)?;

            Ok(ParsedMember::Member(MemberDecl {
                flags: flags(MemberKind::MessageHandler),
                name: message.value,
                member_type,
                params,
                initializers: vec![],
                body: Some(body),
                annotations,
                location: message.location,
            }))
        }
        TokenKind::Fun => {
            let function = parse_function_decl(parser, annotations, false)?;

            Ok(ParsedMember::Member(MemberDecl {
                flags: flags(MemberKind::Method),
                name: function.name,
                member_type: function.return_type,
                params: function.params,
                initializers: vec![],
                body: function.body,
                annotations: function.annotations,
                location: function.location,
            }))
        }
        TokenKind::Operator => {
            reject_operator_annotations(parser, &annotations);
            Ok(ParsedMember::Operator(parse_operator(parser, None)?))
        }
        kind if kind.is_dynamic_declarator() => {
            parser.advance();
            let name = parser.expect_message(TokenKind::Identifier, "expected field name")?;
            let member_type = if parser.eat(TokenKind::Colon) {
                parse_type(parser)?
            } else {
                Type::Dynamic(name.location.clone())
            };
            parse_field_rest(parser, flags(MemberKind::Field), name.value, member_type, name.location, annotations)
        }
        TokenKind::Identifier
            if parser.current_token().value == object_name
                && parser.peek_kind(1) == TokenKind::OpenParen =>
        {
            parse_constructor(parser, flags(MemberKind::Constructor), annotations)
        }
        _ => {
            let member_type = parse_type(parser)?;

            if parser.current_token_kind() == TokenKind::Operator {
                reject_operator_annotations(parser, &annotations);
                return Ok(ParsedMember::Operator(parse_operator(parser, Some(member_type))?));
            }

            let name = parser.expect_message(TokenKind::Identifier, "expected member name")?;

            if parser.current_token_kind() != TokenKind::OpenParen {
                return parse_field_rest(
                    parser,
                    flags(MemberKind::Field),
                    name.value,
                    member_type,
                    name.location,
                    annotations,
                );
            }

            let (params, _) = parse_params(parser)?;
            let return_type = if parser.eat(TokenKind::Arrow) {
                parse_type(parser)?
            } else {
                member_type
            };
            let body = parse_block(parser)?;

            Ok(ParsedMember::Member(MemberDecl {
                flags: flags(MemberKind::Method),
                name: name.value,
                member_type: Some(return_type),
                params,
                initializers: vec![],
                body: Some(body),
                annotations,
                location: name.location,
            }))
        }
    }
}

/// `[= expr];` after a field name.
fn parse_field_rest(
    parser: &mut Parser,
    flags: MemberFlags,
    name: String,
    member_type: Type,
    location: SourceLocation,
    annotations: Vec<Annotation>,
) -> Result<ParsedMember, Error> {
    let mut initializers = vec![];
    if parser.eat(TokenKind::Assignment) {
        let value = parse_expr(parser, BindingPower::Default)?;
        initializers.push(FieldInitializer {
            field: name.clone(),
            value,
            location: location.clone(),
        });
    }

    parser.expect_message(TokenKind::Semicolon, "expected ';' after field declaration")?;

    Ok(ParsedMember::Member(MemberDecl {
        flags,
        name,
        member_type: Some(member_type),
        params: vec![],
        initializers,
        body: None,
        annotations,
        location,
    }))
}

/// `Name(params) [: field(expr), ...] block`
fn parse_constructor(
    parser: &mut Parser,
    flags: MemberFlags,
    annotations: Vec<Annotation>,
) -> Result<ParsedMember, Error> {
    let name = parser.advance().clone();
    let (params, _) = parse_params(parser)?;

    let mut initializers = vec![];
    if parser.eat(TokenKind::Colon) {
        loop {
            let field = parser.expect_message(
                TokenKind::Identifier,
                "expected field name in initializer list",
            )?;
            parser.expect_message(TokenKind::OpenParen, "expected '(' after field name")?;
            let value = parse_expr(parser, BindingPower::Default)?;
            let close = parser.expect_message(TokenKind::CloseParen, "expected ')' after initializer")?;

            initializers.push(FieldInitializer {
                location: field.location.to(&close.location),
                field: field.value,
                value,
            });

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    let body = parse_block(parser)?;

    Ok(ParsedMember::Member(MemberDecl {
        flags,
        name: name.value,
        member_type: None,
        params,
        initializers,
        body: Some(body),
        annotations,
        location: name.location,
    }))
}

fn reject_operator_annotations(parser: &mut Parser, annotations: &[Annotation]) {
    if let Some(first) = annotations.first() {
        parser.report(Error::new(
            ErrorImpl::AnnotationsNotAllowed {
                declaration: String::from("an operator overload"),
            },
            first.location.clone(),
        ));
    }
}

/// `operator <op> (params) [-> RetType] block`, the return type given before
/// `operator` or after the parameters.
fn parse_operator(
    parser: &mut Parser,
    leading_return_type: Option<Type>,
) -> Result<OperatorOverload, Error> {
    let keyword = parser.expect(TokenKind::Operator)?;
    let op = parse_operator_symbol(parser)?;
    let (params, _) = parse_params(parser)?;

    let trailing_return_type = if parser.eat(TokenKind::Arrow) {
        Some(parse_type(parser)?)
    } else {
        None
    };
    let return_type = trailing_return_type.or(leading_return_type).ok_or_else(|| {
        Error::new(
            ErrorImpl::MissingOperatorReturnType {
                operator: op.clone(),
            },
            keyword.location.clone(),
        )
    })?;

    let body = parse_block(parser)?;

    Ok(OperatorOverload {
        op,
        params,
        return_type,
        body,
        location: keyword.location,
    })
}

fn parse_operator_symbol(parser: &mut Parser) -> Result<String, Error> {
    match parser.current_token_kind() {
        TokenKind::OpenBracket => {
            parser.advance();
            parser.expect_message(TokenKind::CloseBracket, "expected ']' in 'operator[]'")?;
            Ok(String::from("[]"))
        }
        TokenKind::OpenParen if parser.peek_kind(1) == TokenKind::CloseParen => {
            parser.advance();
            parser.advance();
            Ok(String::from("()"))
        }
        TokenKind::Plus
        | TokenKind::Dash
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Percent
        | TokenKind::Equals
        | TokenKind::NotEquals
        | TokenKind::Less
        | TokenKind::LessEquals
        | TokenKind::Greater
        | TokenKind::GreaterEquals
        | TokenKind::Not
        | TokenKind::And
        | TokenKind::Or
        | TokenKind::PlusPlus
        | TokenKind::MinusMinus
        | TokenKind::Assignment
        | TokenKind::PlusEquals
        | TokenKind::MinusEquals
        | TokenKind::StarEquals
        | TokenKind::SlashEquals
        | TokenKind::PercentEquals => Ok(parser.advance().value.clone()),
        _ => Err(parser.error_here(ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected an overloadable operator"),
        })),
    }
}

/// `union Name { Type, Type, ... }`
fn parse_union_decl(parser: &mut Parser) -> Result<Stmt, Error> {
    parser.advance();
    let name = parser.expect_message(TokenKind::Identifier, "expected union name")?;
    parser.expect_message(TokenKind::OpenCurly, "expected '{' after union name")?;

    let mut member_types = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        member_types.push(parse_type(parser)?);
        if !(parser.eat(TokenKind::Comma) || parser.eat(TokenKind::Semicolon)) {
            break;
        }
    }

    parser.expect_message(TokenKind::CloseCurly, "expected '}' after union members")?;
    parser.eat(TokenKind::Semicolon);

    Ok(Stmt::UnionDecl(UnionDecl {
        name: name.value,
        member_types,
        location: name.location,
    }))
}

/// `template <params> declaration`
fn parse_template_decl(parser: &mut Parser, annotations: Vec<Annotation>) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();
    let params = parse_template_params(parser)?;

    if !starts_declaration(parser) {
        return Err(parser.error_here(ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected a declaration after template parameters"),
        }));
    }

    let inner = parse_declaration(parser, annotations)?.ok_or_else(|| parser.unexpected())?;

    Ok(Stmt::TemplateDecl(TemplateDecl {
        params,
        inner: Box::new(inner),
        location,
    }))
}

fn parse_template_params(parser: &mut Parser) -> Result<Vec<TemplateParameter>, Error> {
    parser.expect_message(TokenKind::Less, "expected '<' to open template parameters")?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::Greater {
        params.push(parse_template_param(parser)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_message(TokenKind::Greater, "expected '>' after template parameters")?;
    Ok(params)
}

/// `typename [...] T [= Type]`, `Type [...] N [= expr]` or
/// `template <...> typename [...] C`.
fn parse_template_param(parser: &mut Parser) -> Result<TemplateParameter, Error> {
    let (kind, param_type) = match parser.current_token_kind() {
        TokenKind::Typename => {
            parser.advance();
            (TemplateParameterKind::Type, None)
        }
        TokenKind::Template => {
            parser.advance();
            parse_template_params(parser)?;
            parser.expect_message(
                TokenKind::Typename,
                "expected 'typename' after template template parameters",
            )?;
            (TemplateParameterKind::Template, None)
        }
        _ => (TemplateParameterKind::NonType, Some(parse_type(parser)?)),
    };

    let is_variadic = parser.eat(TokenKind::Ellipsis);
    let name = parser.expect_message(TokenKind::Identifier, "expected template parameter name")?;

    let default = if parser.eat(TokenKind::Assignment) {
        // `>` closes the parameter list, so defaults stop below relational operators.
        Some(match kind {
            TemplateParameterKind::NonType => {
                TemplateDefault::Value(parse_expr(parser, BindingPower::Relational)?)
            }
            _ => TemplateDefault::Type(parse_type(parser)?),
        })
    } else {
        None
    };

    Ok(TemplateParameter {
        kind,
        name: name.value,
        is_variadic,
        param_type,
        default,
        location: name.location,
    })
}
