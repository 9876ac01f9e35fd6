use crate::{
    ast::{
        ast::Stmt,
        declarations::{MultiVarDecl, VarDecl, VarDeclKind},
        statements::{
            BlockStmt, DoWhileStmt, ErrorStmt, ExpressionStmt, ForStmt, IfStmt, ReturnStmt,
            ScopeStmt, UnsafeStmt, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{decl::parse_annotation, parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_handler(parser.current_token_kind()) {
        return handler(parser);
    }

    if starts_typed_declaration(parser) {
        return parse_typed_var_decl(parser, false, false);
    }

    parse_expression_stmt(parser)
}

/// Decides whether the cursor sits on `Type name ...`.
///
/// Builtin type keywords and `[` always start a declaration. An identifier
/// does only when a type parses from it and is followed by a name and one of
/// `=`, `;`, `,` or `(`. The cursor is left where it was.
pub fn starts_typed_declaration(parser: &mut Parser) -> bool {
    match parser.current_token_kind() {
        kind if kind.is_builtin_type() => true,
        TokenKind::OpenBracket => true,
        TokenKind::FreeObj => parser.peek_kind(1) != TokenKind::OpenCurly,
        TokenKind::Identifier => {
            let start = parser.position();
            let typed = parse_type(parser).is_ok()
                && parser.current_token_kind() == TokenKind::Identifier
                && matches!(
                    parser.peek_kind(1),
                    TokenKind::Assignment
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::OpenParen
                );
            parser.rewind(start);
            typed
        }
        _ => false,
    }
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let expression = parse_expr(parser, BindingPower::Default)?;

    parser.expect_message(TokenKind::Semicolon, "expected ';' after expression")?;

    Ok(Stmt::Expression(ExpressionStmt {
        location: expression.location().clone(),
        expression,
    }))
}

/// Entry for `let`, `var`, `dynamic`, `hoist` and `const`.
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let mut is_hoisted = false;
    let mut is_const = false;

    loop {
        match parser.current_token_kind() {
            TokenKind::Hoist => is_hoisted = true,
            TokenKind::Const => is_const = true,
            _ => break,
        }
        parser.advance();
    }

    let kind = parser.current_token_kind();
    if kind.is_dynamic_declarator() {
        parser.advance();
        return parse_dynamic_var_decl(parser, is_hoisted, is_const);
    }

    // `const PI = 3.14;` declares without a type, like `let`.
    if kind == TokenKind::Identifier && parser.peek_kind(1) == TokenKind::Assignment {
        return parse_dynamic_var_decl(parser, is_hoisted, is_const);
    }

    parse_typed_var_decl(parser, is_hoisted, is_const)
}

/// `name [: Type] [= expr];` after a `let`, `var` or `dynamic` keyword.
fn parse_dynamic_var_decl(parser: &mut Parser, is_hoisted: bool, is_const: bool) -> Result<Stmt, Error> {
    let name = parser.expect_message(
        TokenKind::Identifier,
        "expected identifier during variable declaration",
    )?;

    let var_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let initializer = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect_message(TokenKind::Semicolon, "expected ';' after variable declaration")?;

    Ok(Stmt::VarDecl(VarDecl::new(
        VarDeclKind::Dynamic,
        name.value,
        var_type,
        initializer,
        is_hoisted,
        is_const,
        name.location,
    )))
}

/// `Type name [= expr] (, name [= expr])*;`
fn parse_typed_var_decl(parser: &mut Parser, is_hoisted: bool, is_const: bool) -> Result<Stmt, Error> {
    let var_type = parse_type(parser)?;
    let mut vars = vec![];

    loop {
        let name = parser.expect_message(
            TokenKind::Identifier,
            "expected identifier during variable declaration",
        )?;

        let initializer = if parser.eat(TokenKind::Assignment) {
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        vars.push(VarDecl::new(
            VarDeclKind::Static,
            name.value,
            Some(var_type.clone()),
            initializer,
            is_hoisted,
            is_const,
            name.location,
        ));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_message(TokenKind::Semicolon, "expected ';' after variable declaration")?;

    if vars.len() == 1 {
        return Ok(Stmt::VarDecl(vars.remove(0)));
    }

    let location = vars[0].location.clone();
    Ok(Stmt::MultiVarDecl(MultiVarDecl { vars, location }))
}

/// Parses `{ stmt* }`.
///
/// Statement errors are reported and replaced by error placeholders. Reaching
/// EOF or a top-level-only keyword before `}` reports an unclosed block and
/// ends the block there.
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let open = parser.expect_message(TokenKind::OpenCurly, "expected '{' to open a block")?;
    let mut body = vec![];

    loop {
        let kind = parser.current_token_kind();
        if kind == TokenKind::CloseCurly {
            parser.advance();
            break;
        }
        if kind == TokenKind::EOF || kind.is_top_level_only() {
            let error = parser.error_here(ErrorImpl::UnclosedBlock {
                opened_line: open.location.line,
            });
            parser.report(error);
            break;
        }

        let start = parser.position();
        match parse_stmt(parser) {
            Ok(stmt) => body.push(stmt),
            Err(error) => {
                let location = error.get_location().clone();
                let message = error.to_string();
                parser.report(error);
                parser.synchronize_in_block();
                body.push(Stmt::Error(ErrorStmt { message, location }));
            }
        }

        if parser.position() == start {
            parser.advance();
        }
    }

    Ok(BlockStmt {
        body,
        location: open.location,
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

pub fn parse_empty_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Empty(parser.advance().location.clone()))
}

/// Body of a control-flow construct: a block, or a bare statement when braces
/// are optional.
fn parse_body(parser: &mut Parser, construct: &str) -> Result<Box<Stmt>, Error> {
    if parser.current_token_kind() == TokenKind::OpenCurly {
        return Ok(Box::new(Stmt::Block(parse_block(parser)?)));
    }

    if parser.flags().braces_required {
        let error = parser.error_here(ErrorImpl::BracesRequired {
            construct: String::from(construct),
        });
        parser.report(error);
    }

    Ok(Box::new(parse_stmt(parser)?))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = parse_body(parser, "if")?;

    let else_branch = if parser.eat(TokenKind::Else) {
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            Some(parse_body(parser, "else")?)
        }
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_branch,
        else_branch,
        location,
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_body(parser, "while")?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        location,
    }))
}

pub fn parse_do_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();

    let body = parse_body(parser, "do")?;
    parser.expect_message(TokenKind::While, "expected 'while' after do body")?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.eat(TokenKind::Semicolon);

    Ok(Stmt::DoWhile(DoWhileStmt {
        body,
        condition,
        location,
    }))
}

/// `for ([init]; [condition]; [increment]) body`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();
    parser.expect_message(TokenKind::OpenParen, "expected '(' after 'for'")?;

    let init = if parser.eat(TokenKind::Semicolon) {
        None
    } else {
        Some(Box::new(parse_stmt(parser)?))
    };

    let condition = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };
    parser.expect_message(TokenKind::Semicolon, "expected ';' after loop condition")?;

    let increment = if parser.current_token_kind() == TokenKind::CloseParen {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };
    parser.expect_message(TokenKind::CloseParen, "expected ')' after for clauses")?;

    let body = parse_body(parser, "for")?;

    Ok(Stmt::For(ForStmt {
        init,
        condition,
        increment,
        body,
        location,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    parser.eat(TokenKind::Semicolon);

    Ok(Stmt::Return(ReturnStmt { value, location }))
}

pub fn parse_unsafe_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();
    let block = parse_block(parser)?;

    Ok(Stmt::Unsafe(UnsafeStmt { block, location }))
}

pub fn parse_scope_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let location = parser.advance().location.clone();
    let block = parse_block(parser)?;

    Ok(Stmt::Scope(ScopeStmt { block, location }))
}

pub fn parse_annotation_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Annotation(parse_annotation(parser)?))
}
