//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statements and
//! declarations.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers
//!
//! Parsing never aborts: a malformed construct is reported, the cursor is
//! resynchronized, and an error placeholder takes its place in the tree.

use std::{collections::HashMap, rc::Rc};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Program, Stmt},
        statements::ErrorStmt,
    },
    config::Flags,
    errors::{
        diagnostics::Diagnostic,
        errors::{Error, ErrorImpl},
    },
    lexer::tokens::{Token, TokenKind},
    SourceLocation, MK_TOKEN,
};

use super::{
    decl::parse_top_level,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and maintains lookup tables for
/// parsing statements, expressions, and types. It tracks the current
/// position in the token stream and collects diagnostics as it goes.
pub struct Parser {
    /// The list of tokens to parse, always ending with EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    flags: Flags,
    diagnostics: Vec<Diagnostic>,
    /// Token position of the last reported diagnostic
    last_error_pos: Option<usize>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type handlers
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// An EOF token is appended when the stream does not already end with one,
    /// so reads past the end always land on the sentinel.
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>, flags: Flags) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let location = tokens
                .last()
                .map(|token| token.location.clone())
                .unwrap_or_else(|| SourceLocation::new(1, 1, 0, Rc::clone(&file)));
            tokens.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), location));
        }

        Parser {
            tokens,
            pos: 0,
            file,
            flags,
            diagnostics: vec![],
            last_error_pos: None,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.peek(0)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the token `offset` positions ahead, or EOF past the end.
    pub fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Returns the token `offset` positions behind the cursor, if any.
    pub fn look_back(&self, offset: usize) -> Option<&Token> {
        self.pos
            .checked_sub(offset)
            .and_then(|index| self.tokens.get(index))
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The cursor never moves past EOF.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.value.clone(),
                    },
                    token.location.clone(),
                )),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a token of the specified kind, explaining what was expected on failure.
    pub fn expect_message(&mut self, expected_kind: TokenKind, message: &str) -> Result<Token, Error> {
        let error = self.error_here(ErrorImpl::UnexpectedTokenDetailed {
            token: self.current_token().value.clone(),
            message: String::from(message),
        });
        self.expect_error(expected_kind, Some(error))
    }

    /// Builds an error located at the current token.
    pub fn error_here(&self, error: ErrorImpl) -> Error {
        Error::new(error, self.current_token().location.clone())
    }

    /// Builds an "unexpected token" error for the current token.
    pub fn unexpected(&self) -> Error {
        self.error_here(ErrorImpl::UnexpectedToken {
            token: self.current_token().value.clone(),
        })
    }

    /// Consumes the current token when it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Records a diagnostic. At most one diagnostic is kept per token position.
    pub fn report(&mut self, error: Error) {
        if self.last_error_pos == Some(self.pos) {
            trace!(
                "dropping diagnostic at token {}: {}",
                self.pos,
                error.get_error_name()
            );
            return;
        }

        debug!("{}: {}", error.get_location(), error);
        self.last_error_pos = Some(self.pos);
        self.diagnostics.push(Diagnostic::from(error));
    }

    /// Panic-mode recovery.
    ///
    /// Always consumes the offending token, then skips until the previous token
    /// ended a statement or block, or the current token starts a construct.
    pub fn synchronize(&mut self) {
        let start = self.pos;
        self.advance();

        while self.has_tokens() {
            let ended = self
                .look_back(1)
                .is_some_and(|token| {
                    matches!(token.kind, TokenKind::Semicolon | TokenKind::CloseCurly)
                });
            if ended || self.current_token_kind().starts_construct() {
                break;
            }
            self.advance();
        }

        trace!("synchronize skipped {} tokens", self.pos - start);
    }

    /// Recovery inside a `{ ... }` body.
    ///
    /// Like `synchronize`, but never consumes the `}` that closes the
    /// enclosing body: it stops in front of it. Braces opened while skipping
    /// are matched and skipped whole.
    pub fn synchronize_in_block(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;

        while self.has_tokens() {
            match self.current_token_kind() {
                TokenKind::CloseCurly if depth == 0 => break,
                TokenKind::CloseCurly => depth -= 1,
                TokenKind::OpenCurly => depth += 1,
                kind if depth == 0 && self.pos > start && kind.starts_construct() => break,
                _ => {}
            }

            self.advance();

            let ended = self
                .look_back(1)
                .is_some_and(|token| token.kind == TokenKind::Semicolon);
            if depth == 0 && ended {
                break;
            }
        }

        trace!("synchronize in block skipped {} tokens", self.pos - start);
    }

    /// Saves the cursor for tentative parsing.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restores a cursor saved with `position`.
    pub fn rewind(&mut self, position: usize) {
        self.pos = position;
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn get_stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt_lookup.get(&kind).copied()
    }

    pub fn get_nud_handler(&self, kind: TokenKind) -> Option<NUDHandler> {
        self.nud_lookup.get(&kind).copied()
    }

    pub fn get_led_handler(&self, kind: TokenKind) -> Option<LEDHandler> {
        self.led_lookup.get(&kind).copied()
    }

    pub fn get_binding_power(&self, kind: TokenKind) -> BindingPower {
        self.binding_power_lookup
            .get(&kind)
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    pub fn get_type_nud_handler(&self, kind: TokenKind) -> Option<TypeNUDHandler> {
        self.type_nud_lookup.get(&kind).copied()
    }

    /// Registers a left denotation (infix or postfix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type handler for a token.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Parses a stream of tokens into a Program.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses declarations until EOF. Errors
/// never escape: each one becomes a diagnostic and an error placeholder.
pub fn parse(tokens: Vec<Token>, file: Rc<String>, flags: Flags) -> (Program, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens, Rc::clone(&file), flags);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let mut declarations = vec![];

    while parser.has_tokens() {
        let start = parser.position();

        match parse_top_level(&mut parser) {
            Ok(Some(declaration)) => declarations.push(declaration),
            Ok(None) => {}
            Err(error) => {
                let location = error.get_location().clone();
                let message = error.to_string();
                parser.report(error);
                parser.synchronize();
                declarations.push(Stmt::Error(ErrorStmt { message, location }));
            }
        }

        if parser.position() == start {
            parser.advance();
        }
    }

    debug!(
        "parsed {} top-level declarations from {}",
        declarations.len(),
        file
    );

    let program = Program {
        declarations,
        location: SourceLocation::new(1, 1, 0, file),
    };

    (program, parser.into_diagnostics())
}
