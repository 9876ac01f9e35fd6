use crate::{
    ast::{
        ast::Stmt,
        declarations::{FunctionDecl, Parameter},
        expressions::{
            ArrayAccessExpr, BinaryExpr, BinaryOperator, CallExpr, Expr, FreeObjectExpr,
            LambdaExpr, LiteralExpr, LiteralKind, MemberAccessExpr, NewExpr,
            StructInitializerExpr, TemplatePart, TemplateStringExpr, UnaryExpr, UnaryOperator,
            VarExpr,
        },
        statements::{BlockStmt, ReturnStmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{
    decl::parse_params, lookups::BindingPower, parser::Parser, stmt::parse_block,
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let nud = parser
        .get_nud_handler(parser.current_token_kind())
        .ok_or_else(|| parser.unexpected())?;
    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.get_binding_power(parser.current_token_kind()) > bp {
        let kind = parser.current_token_kind();
        let led = parser
            .get_led_handler(kind)
            .ok_or_else(|| parser.unexpected())?;
        let binding_power = parser.get_binding_power(kind);
        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();
    let literal = |kind: LiteralKind| {
        Expr::Literal(LiteralExpr {
            kind,
            text: token.value.clone(),
            location: token.location.clone(),
        })
    };

    match token.kind {
        TokenKind::Number => Ok(literal(LiteralKind::Number)),
        TokenKind::String => Ok(literal(LiteralKind::String)),
        TokenKind::True | TokenKind::False => Ok(literal(LiteralKind::Bool)),
        TokenKind::Null => Ok(literal(LiteralKind::Nil)),
        TokenKind::Identifier => Ok(Expr::Var(VarExpr {
            name: token.value.clone(),
            location: token.location.clone(),
        })),
        TokenKind::This => Ok(Expr::This(token.location.clone())),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
            },
            token.location.clone(),
        )),
    }
}

fn binary_operator(token: &Token) -> Result<BinaryOperator, Error> {
    let op = match token.kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Dash => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::Percent => BinaryOperator::Mod,
        TokenKind::Equals => BinaryOperator::Eq,
        TokenKind::NotEquals => BinaryOperator::Neq,
        TokenKind::Less => BinaryOperator::Lt,
        TokenKind::Greater => BinaryOperator::Gt,
        TokenKind::LessEquals => BinaryOperator::Lte,
        TokenKind::GreaterEquals => BinaryOperator::Gte,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        TokenKind::Assignment => BinaryOperator::Assign,
        TokenKind::PlusEquals => BinaryOperator::AddAssign,
        TokenKind::MinusEquals => BinaryOperator::SubAssign,
        TokenKind::StarEquals => BinaryOperator::MulAssign,
        TokenKind::SlashEquals => BinaryOperator::DivAssign,
        TokenKind::PercentEquals => BinaryOperator::ModAssign,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.location.clone(),
            ))
        }
    };
    Ok(op)
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    let location = left.location().to(right.location());
    Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location,
    })
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = binary_operator(&operator_token)?;

    let right = parse_expr(parser, bp)?;

    Ok(binary(op, left, right))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = binary_operator(&operator_token)?;

    // Right associative: the value may itself be an assignment.
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(binary(op, left, value))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let (op, bp) = match operator_token.kind {
        TokenKind::Dash => (UnaryOperator::Negate, BindingPower::Unary),
        TokenKind::Not => (UnaryOperator::Not, BindingPower::Unary),
        TokenKind::PlusPlus => (UnaryOperator::Inc, BindingPower::Increment),
        TokenKind::MinusMinus => (UnaryOperator::Dec, BindingPower::Increment),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.location,
            ))
        }
    };

    let operand = parse_expr(parser, bp)?;
    let location = operator_token.location.to(operand.location());

    Ok(Expr::Unary(UnaryExpr {
        op,
        operand: Box::new(operand),
        is_prefix: true,
        location,
    }))
}

pub fn parse_postfix_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = if operator_token.kind == TokenKind::PlusPlus {
        UnaryOperator::Inc
    } else {
        UnaryOperator::Dec
    };
    let location = left.location().to(&operator_token.location);

    Ok(Expr::Unary(UnaryExpr {
        op,
        operand: Box::new(left),
        is_prefix: false,
        location,
    }))
}

/// Parses `arg, arg, ...` up to and including the closing parenthesis.
pub fn parse_arguments(parser: &mut Parser) -> Result<(Vec<Expr>, Token), Error> {
    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    let close = parser.expect_message(TokenKind::CloseParen, "expected ')' after arguments")?;
    Ok((args, close))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let (args, close) = parse_arguments(parser)?;

    Ok(Expr::Call(CallExpr {
        location: left.location().to(&close.location),
        callee: Box::new(left),
        args,
    }))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let member = parser.expect_message(TokenKind::Identifier, "expected member name after '.'")?;

    Ok(Expr::MemberAccess(MemberAccessExpr {
        location: left.location().to(&member.location),
        object: Box::new(left),
        member: member.value,
    }))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    let close = parser.expect_message(TokenKind::CloseBracket, "expected ']' after index")?;

    Ok(Expr::ArrayAccess(ArrayAccessExpr {
        location: left.location().to(&close.location),
        array: Box::new(left),
        index: Box::new(index),
    }))
}

/// `(` starts either an arrow lambda or a grouped expression.
///
/// The tokens up to the matching `)` are scanned once; a following `->` or
/// `=>` makes the parenthesis a lambda parameter list. Either way the
/// contents are parsed a single time.
pub fn parse_paren_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if starts_lambda(parser) {
        let open = parser.current_token().clone();
        let (params, uses_sugar) = parse_params(parser)?;
        return parse_lambda_rest(parser, open, params, uses_sugar);
    }

    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_message(TokenKind::CloseParen, "expected ')' after expression")?;

    Ok(expr)
}

/// Looks past the `(` under the cursor to its matching `)` without moving.
fn starts_lambda(parser: &Parser) -> bool {
    let mut depth = 0usize;
    let mut offset = 0;

    loop {
        match parser.peek_kind(offset) {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return matches!(
                        parser.peek_kind(offset + 1),
                        TokenKind::Arrow | TokenKind::LambdaArrow
                    );
                }
            }
            TokenKind::EOF => return false,
            _ => {}
        }
        offset += 1;
    }
}

fn parse_lambda_rest(
    parser: &mut Parser,
    open: Token,
    params: Vec<Parameter>,
    uses_param_struct_sugar: bool,
) -> Result<Expr, Error> {
    let return_type = if parser.eat(TokenKind::Arrow) {
        Some(parse_type(parser)?)
    } else {
        None
    };
    parser.expect_message(TokenKind::LambdaArrow, "expected '=>' in lambda")?;

    let body = if parser.current_token_kind() == TokenKind::OpenCurly {
        parse_block(parser)?
    } else {
        let value = parse_expr(parser, BindingPower::Default)?;
        let location = value.location().clone();
        BlockStmt {
            body: vec![Stmt::Return(ReturnStmt {
                value: Some(value),
                location: location.clone(),
            })],
            location,
        }
    };

    let location = open.location;
    Ok(Expr::Lambda(LambdaExpr {
        function: FunctionDecl {
            name: String::new(),
            params,
            return_type,
            body: Some(body),
            is_async: false,
            uses_param_struct_sugar,
            annotations: vec![],
            location: location.clone(),
        },
        location,
    }))
}

/// `new Name(args)`
pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().location.clone();
    let class_name = parser.expect_message(TokenKind::Identifier, "expected class name after 'new'")?;

    let (args, end) = if parser.eat(TokenKind::OpenParen) {
        let (args, close) = parse_arguments(parser)?;
        (args, close.location)
    } else {
        (vec![], class_name.location.clone())
    };

    Ok(Expr::New(NewExpr {
        class_name: class_name.value,
        args,
        location: start.to(&end),
    }))
}

/// A `{` right after `<type> <name> =` opens a struct initializer.
fn in_struct_init_context(parser: &Parser) -> bool {
    let after_assignment = parser
        .look_back(1)
        .is_some_and(|token| token.kind == TokenKind::Assignment);
    let after_type = parser.look_back(3).is_some_and(|token| {
        token.kind.is_builtin_type() || token.kind == TokenKind::Identifier
    });
    after_assignment && after_type
}

pub fn parse_curly_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if in_struct_init_context(parser) {
        parse_struct_initializer(parser)
    } else {
        parse_object_literal(parser)
    }
}

/// `freeobj { ... }` is always a free object.
pub fn parse_free_object_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    parse_object_literal(parser)
}

fn parse_object_literal(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.expect(TokenKind::OpenCurly)?;
    let mut properties = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = match parser.current_token_kind() {
            TokenKind::Identifier | TokenKind::String => parser.advance().value.clone(),
            _ => {
                return Err(parser.error_here(ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected property name"),
                }))
            }
        };
        parser.expect_message(TokenKind::Colon, "expected ':' after property name")?;
        properties.push((key, parse_expr(parser, BindingPower::Default)?));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    let close = parser.expect_message(TokenKind::CloseCurly, "expected '}' after object literal")?;

    Ok(Expr::FreeObject(FreeObjectExpr {
        properties,
        location: open.location.to(&close.location),
    }))
}

fn parse_struct_initializer(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.expect(TokenKind::OpenCurly)?;
    let mut fields = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        if parser.eat(TokenKind::Dot) {
            let name = parser.expect_message(TokenKind::Identifier, "expected field name after '.'")?;
            parser.expect_message(TokenKind::Assignment, "expected '=' after field name")?;
            fields.push((Some(name.value), parse_expr(parser, BindingPower::Default)?));
        } else if parser.current_token_kind() == TokenKind::Identifier
            && parser.peek_kind(1) == TokenKind::Colon
        {
            let name = parser.advance().value.clone();
            parser.advance();
            fields.push((Some(name), parse_expr(parser, BindingPower::Default)?));
        } else {
            fields.push((None, parse_expr(parser, BindingPower::Default)?));
        }

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    let close = parser.expect_message(TokenKind::CloseCurly, "expected '}' after initializer")?;
    let is_positional = fields.iter().all(|(name, _)| name.is_none());

    Ok(Expr::StructInitializer(StructInitializerExpr {
        fields,
        is_positional,
        location: open.location.to(&close.location),
    }))
}

/// `` `text ${expr} text` ``
pub fn parse_template_string_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance().clone();
    let mut parts = vec![];

    let close = loop {
        match parser.current_token_kind() {
            TokenKind::TemplatePart => {
                parts.push(TemplatePart::Text(parser.advance().value.clone()));
            }
            TokenKind::DollarCurly => {
                parser.advance();
                let expr = parse_expr(parser, BindingPower::Default)?;
                parser.expect_message(TokenKind::CloseCurly, "expected '}' after interpolation")?;
                parts.push(TemplatePart::Interpolation(expr));
            }
            TokenKind::Backtick => break parser.advance().clone(),
            _ => return Err(parser.unexpected()),
        }
    };

    Ok(Expr::TemplateString(TemplateStringExpr {
        parts,
        location: open.location.to(&close.location),
    }))
}
