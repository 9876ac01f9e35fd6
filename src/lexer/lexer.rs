use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    SourceLocation, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(source: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(&format!("^(?:{})", source)).expect("token patterns are valid regexes"),
        handler,
    }
}

lazy_static! {
    // First match wins, so longer operators precede their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("\\s+", skip_handler),
        pattern("//[^\\n]*", skip_handler),
        pattern("(?s)/\\*.*?\\*/", skip_handler),
        pattern("/\\*", unterminated_comment_handler),
        pattern("[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("[0-9]+(\\.[0-9]+)?([eE][+-]?[0-9]+)?[fFlL]?", number_handler),
        pattern("\"([^\"\\\\\\n]|\\\\.)*\"", string_handler),
        pattern("\"", unterminated_string_handler),
        pattern("`", backtick_handler),
        pattern("\\.\\.\\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        pattern("\\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern("\\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern("\\{", open_curly_handler),
        pattern("\\}", close_curly_handler),
        pattern("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("=>", MK_DEFAULT_HANDLER!(TokenKind::LambdaArrow, "=>")),
        pattern("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern("!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern("\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern("&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern("\\+\\+", MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++")),
        pattern("\\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("--", MK_DEFAULT_HANDLER!(TokenKind::MinusMinus, "--")),
        pattern("-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("\\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern("/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern("%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern("%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern("\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern("@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
    /// Open `${` interpolations, each with its count of unclosed `{`.
    template_braces: Vec<u32>,
    in_template_text: bool,
}

impl Lexer {
    pub fn new(source: &str, file: Option<&str>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(String::from(file))
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            tokens: vec![],
            source: String::from(source),
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
            template_braces: vec![],
            in_template_text: false,
        }
    }

    /// Moves past `n` bytes of source, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Location of a lexeme of `length` characters starting at the cursor.
    pub fn location(&self, length: usize) -> SourceLocation {
        SourceLocation::new(self.line, self.column, length as u32, Rc::clone(&self.file))
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|found| String::from(found.as_str()))
            .unwrap_or_default()
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn unterminated_comment_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(ErrorImpl::UnterminatedComment, lexer.location(2)))
}

fn unterminated_string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(ErrorImpl::UnterminatedString, lexer.location(1)))
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let location = lexer.location(matched.chars().count());

    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, location));
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let location = lexer.location(value.chars().count());
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, location));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let raw = lexer.matched(regex);
    let location = lexer.location(raw.chars().count());
    let string_literal = unescape(&raw[1..raw.len() - 1], '"');

    lexer.advance_n(raw.len());
    lexer.push(MK_TOKEN!(TokenKind::String, string_literal, location));
    Ok(())
}

fn unescape(literal: &str, quote: char) -> String {
    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('$') => result.push('$'),
            Some(next) if next == quote => result.push(quote),
            Some('x') => {
                chars.next();
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            hex.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
                continue;
            }
            // Unknown escapes keep their backslash
            Some(_) => {
                result.push(ch);
                continue;
            }
            None => {
                result.push(ch);
                continue;
            }
        }

        chars.next();
    }

    result
}

fn backtick_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let location = lexer.location(1);
    lexer.push(MK_TOKEN!(TokenKind::Backtick, String::from("`"), location));
    lexer.advance_n(1);
    lexer.in_template_text = true;
    Ok(())
}

fn open_curly_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    if let Some(depth) = lexer.template_braces.last_mut() {
        *depth += 1;
    }

    let location = lexer.location(1);
    lexer.push(MK_TOKEN!(TokenKind::OpenCurly, String::from("{"), location));
    lexer.advance_n(1);
    Ok(())
}

fn close_curly_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    match lexer.template_braces.last().copied() {
        Some(0) => {
            // Closes a `${`, so template text resumes
            lexer.template_braces.pop();
            lexer.in_template_text = true;
        }
        Some(depth) => {
            if let Some(last) = lexer.template_braces.last_mut() {
                *last = depth - 1;
            }
        }
        None => {}
    }

    let location = lexer.location(1);
    lexer.push(MK_TOKEN!(TokenKind::CloseCurly, String::from("}"), location));
    lexer.advance_n(1);
    Ok(())
}

/// Reads literal template text up to the closing backtick or the next `${`.
fn template_text(lexer: &mut Lexer) -> Result<(), Error> {
    let start = lexer.location(0);
    let rest = String::from(lexer.remainder());

    let mut end = None;
    let mut escaped = false;
    for (index, ch) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '`' => {
                end = Some((index, false));
                break;
            }
            '$' if rest[index + 1..].starts_with('{') => {
                end = Some((index, true));
                break;
            }
            _ => {}
        }
    }

    let Some((end, interpolation)) = end else {
        return Err(Error::new(ErrorImpl::UnterminatedTemplate, start));
    };

    if end > 0 {
        let raw = &rest[..end];
        let location = lexer.location(raw.chars().count());
        lexer.push(MK_TOKEN!(TokenKind::TemplatePart, unescape(raw, '`'), location));
        lexer.advance_n(end);
    }

    lexer.in_template_text = false;
    if interpolation {
        let location = lexer.location(2);
        lexer.push(MK_TOKEN!(TokenKind::DollarCurly, String::from("${"), location));
        lexer.advance_n(2);
        lexer.template_braces.push(0);
    } else {
        let location = lexer.location(1);
        lexer.push(MK_TOKEN!(TokenKind::Backtick, String::from("`"), location));
        lexer.advance_n(1);
    }

    Ok(())
}

/// Turns source text into tokens, ending with a single EOF token.
pub fn tokenize(source: &str, file: Option<&str>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        if lex.in_template_text {
            template_text(&mut lex)?;
            continue;
        }

        let remainder = lex.remainder();
        let found = PATTERNS.iter().find(|pattern| pattern.regex.is_match(remainder));

        match found {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.location(1),
                ))
            }
        }
    }

    if lex.in_template_text || !lex.template_braces.is_empty() {
        return Err(Error::new(ErrorImpl::UnterminatedTemplate, lex.location(0)));
    }

    let location = lex.location(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), location));
    tracing::trace!(count = lex.tokens.len(), file = %lex.file, "tokenized source");

    Ok(lex.tokens)
}
