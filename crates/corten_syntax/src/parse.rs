use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::{error, fmt};

use crate::ast::{AttributeStmt, BlockStmt, Literal, Span, Stmt};

// -----------------------------------------------------------------------------
// ParseError

/// An error produced while turning text into a statement tree.
///
/// Every variant carries the 1-based line/column position of the offending
/// input.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// A character that can never start a token.
    UnexpectedChar { ch: char, span: Span },
    /// A string literal that is not closed before end of line or input.
    UnterminatedString { span: Span },
    /// An escape sequence the string syntax does not define.
    InvalidEscape { ch: char, span: Span },
    /// A numeric literal that does not fit the number syntax.
    InvalidNumber { span: Span },
    /// A well-formed token in a position the grammar does not allow.
    UnexpectedToken {
        found: &'static str,
        expected: &'static str,
        span: Span,
    },
    /// Input ended in the middle of a statement or block.
    UnexpectedEof { expected: &'static str, span: Span },
}

impl ParseError {
    /// Returns the source position of the error.
    pub const fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar { span, .. }
            | Self::UnterminatedString { span }
            | Self::InvalidEscape { span, .. }
            | Self::InvalidNumber { span }
            | Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEof { span, .. } => *span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar { ch, span } => {
                write!(f, "{span}: unexpected character `{ch}`")
            }
            Self::UnterminatedString { span } => {
                write!(f, "{span}: unterminated string literal")
            }
            Self::InvalidEscape { ch, span } => {
                write!(f, "{span}: invalid escape sequence `\\{ch}`")
            }
            Self::InvalidNumber { span } => {
                write!(f, "{span}: invalid number literal")
            }
            Self::UnexpectedToken {
                found,
                expected,
                span,
            } => {
                write!(f, "{span}: unexpected {found}, expected {expected}")
            }
            Self::UnexpectedEof { expected, span } => {
                write!(f, "{span}: unexpected end of input, expected {expected}")
            }
        }
    }
}

impl error::Error for ParseError {}

// -----------------------------------------------------------------------------
// Lexer

#[derive(Debug)]
enum TokenKind {
    Ident(String),
    Value(Literal),
    LBrace,
    RBrace,
    Assign,
    Eof,
}

impl TokenKind {
    fn describe(&self) -> &'static str {
        match self {
            Self::Ident(_) => "identifier",
            Self::Value(_) => "literal",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Assign => "`=`",
            Self::Eof => "end of input",
        }
    }
}

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        let span = self.span();
        let Some(ch) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span,
            });
        };
        let kind = match ch {
            '{' => {
                self.bump();
                TokenKind::LBrace
            }
            '}' => {
                self.bump();
                TokenKind::RBrace
            }
            '=' => {
                self.bump();
                TokenKind::Assign
            }
            '"' => TokenKind::Value(Literal::Str(self.read_string(span)?)),
            '-' | '0'..='9' => TokenKind::Value(self.read_number(span)?),
            ch if is_ident_start(ch) => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => TokenKind::Value(Literal::Bool(true)),
                    "false" => TokenKind::Value(Literal::Bool(false)),
                    _ => TokenKind::Ident(ident),
                }
            }
            ch => return Err(ParseError::UnexpectedChar { ch, span }),
        };
        Ok(Token { kind, span })
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.bump();
            } else {
                break;
            }
        }
        String::from(&self.input[start..self.pos])
    }

    fn read_string(&mut self, span: Span) -> Result<String, ParseError> {
        // Opening quote.
        self.bump();
        let mut value = String::new();
        loop {
            let escape_span = self.span();
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some(ch) => {
                        return Err(ParseError::InvalidEscape {
                            ch,
                            span: escape_span,
                        });
                    }
                    None => return Err(ParseError::UnterminatedString { span }),
                },
                Some('\n') | None => return Err(ParseError::UnterminatedString { span }),
                Some(ch) => value.push(ch),
            }
        }
    }

    fn read_number(&mut self, span: Span) -> Result<Literal, ParseError> {
        let start = self.pos;
        let negative = self.peek_char() == Some('-');
        if negative {
            self.bump();
        }
        let digits = self.consume_digits();
        if digits == 0 {
            return Err(ParseError::InvalidNumber { span });
        }
        let mut float = false;
        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|ch| ch.is_ascii_digit())
        {
            float = true;
            self.bump();
            self.consume_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            float = true;
            self.bump();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump();
            }
            if self.consume_digits() == 0 {
                return Err(ParseError::InvalidNumber { span });
            }
        }
        let text = &self.input[start..self.pos];
        if float {
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber { span })?;
            return Ok(Literal::Float(value));
        }
        if negative {
            let value = text
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidNumber { span })?;
            return Ok(Literal::Int(value));
        }
        let value = text
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidNumber { span })?;
        Ok(match i64::try_from(value) {
            Ok(value) => Literal::Int(value),
            Err(_) => Literal::Uint(value),
        })
    }

    fn consume_digits(&mut self) -> usize {
        let mut count = 0;
        while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
            count += 1;
        }
        count
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

// -----------------------------------------------------------------------------
// Parser

/// Parses configuration text into an ordered statement tree.
///
/// The grammar is deliberately small: a body is a sequence of statements,
/// `ident = literal` is an attribute, `ident { body }` is a block, and `//`
/// starts a line comment. A block's body is scoped strictly to that block.
///
/// # Examples
///
/// ```
/// use corten_syntax::parse;
///
/// let stmts = parse("limit = 10\nserver { addr = \"0.0.0.0\" }").unwrap();
/// assert_eq!(stmts.len(), 2);
/// assert_eq!(stmts[1].name(), "server");
/// ```
pub fn parse(input: &str) -> Result<Vec<Stmt>, ParseError> {
    let mut parser = Parser::new(input)?;
    let stmts = parser.parse_body(false)?;
    debug_assert!(matches!(parser.token.kind, TokenKind::Eof));
    Ok(stmts)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token()?;
        Ok(Self { lexer, token })
    }

    /// Advances one token and returns the token that was current.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(core::mem::replace(&mut self.token, next))
    }

    fn parse_body(&mut self, nested: bool) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            match &self.token.kind {
                TokenKind::Eof => {
                    if nested {
                        return Err(ParseError::UnexpectedEof {
                            expected: "`}`",
                            span: self.token.span,
                        });
                    }
                    return Ok(stmts);
                }
                TokenKind::RBrace if nested => return Ok(stmts),
                TokenKind::Ident(_) => stmts.push(self.parse_stmt()?),
                kind => {
                    return Err(ParseError::UnexpectedToken {
                        found: kind.describe(),
                        expected: "a statement",
                        span: self.token.span,
                    });
                }
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let token = self.bump()?;
        let TokenKind::Ident(name) = token.kind else {
            unreachable!("parse_stmt is only entered on an identifier");
        };
        let span = token.span;
        match &self.token.kind {
            TokenKind::Assign => {
                self.bump()?;
                let value = self.parse_value()?;
                Ok(Stmt::Attribute(AttributeStmt {
                    name: Cow::Owned(name),
                    value,
                    span,
                }))
            }
            TokenKind::LBrace => {
                self.bump()?;
                let body = self.parse_body(true)?;
                // `parse_body(true)` only returns at a closing brace.
                self.bump()?;
                Ok(Stmt::Block(BlockStmt {
                    name: Cow::Owned(name),
                    body,
                    span,
                }))
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof {
                expected: "`=` or `{`",
                span: self.token.span,
            }),
            kind => Err(ParseError::UnexpectedToken {
                found: kind.describe(),
                expected: "`=` or `{`",
                span: self.token.span,
            }),
        }
    }

    fn parse_value(&mut self) -> Result<Literal, ParseError> {
        match &self.token.kind {
            TokenKind::Value(_) => {
                let token = self.bump()?;
                let TokenKind::Value(value) = token.kind else {
                    unreachable!("checked above");
                };
                Ok(value)
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof {
                expected: "a literal value",
                span: self.token.span,
            }),
            kind => Err(ParseError::UnexpectedToken {
                found: kind.describe(),
                expected: "a literal value",
                span: self.token.span,
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{ParseError, parse};
    use crate::ast::{Literal, Span, Stmt};

    #[test]
    fn empty_input() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("   \n\t  ").unwrap(), vec![]);
        assert_eq!(parse("// only a comment\n").unwrap(), vec![]);
    }

    #[test]
    fn attributes() {
        let stmts = parse("a = 1\nb = -2\nc = 1.5\nd = true\ne = \"hi\"").unwrap();
        let values: vec::Vec<_> = stmts
            .iter()
            .map(|stmt| match stmt {
                Stmt::Attribute(attr) => attr.value.clone(),
                Stmt::Block(_) => panic!("expected attribute"),
            })
            .collect();
        assert_eq!(
            values,
            vec![
                Literal::Int(1),
                Literal::Int(-2),
                Literal::Float(1.5),
                Literal::Bool(true),
                Literal::Str("hi".into()),
            ]
        );
    }

    #[test]
    fn big_unsigned_becomes_uint() {
        let stmts = parse("n = 9223372036854775808").unwrap();
        let Stmt::Attribute(attr) = &stmts[0] else {
            panic!("expected attribute");
        };
        assert_eq!(attr.value, Literal::Uint(9_223_372_036_854_775_808));
    }

    #[test]
    fn nested_blocks() {
        let stmts = parse("outer {\n  inner {\n    number = 0\n  }\n}").unwrap();
        let Stmt::Block(outer) = &stmts[0] else {
            panic!("expected block");
        };
        assert_eq!(outer.name, "outer");
        assert_eq!(outer.span, Span::new(1, 1));
        let Stmt::Block(inner) = &outer.body[0] else {
            panic!("expected block");
        };
        assert_eq!(inner.name, "inner");
        assert_eq!(inner.body.len(), 1);
        assert_eq!(inner.body[0].name(), "number");
    }

    #[test]
    fn empty_block() {
        let stmts = parse("inner { }").unwrap();
        let Stmt::Block(block) = &stmts[0] else {
            panic!("expected block");
        };
        assert!(block.body.is_empty());
    }

    #[test]
    fn dotted_names() {
        let stmts = parse("log.level = \"warn\"").unwrap();
        assert_eq!(stmts[0].name(), "log.level");
    }

    #[test]
    fn string_escapes() {
        let stmts = parse(r#"s = "a\t\"b\"\n""#).unwrap();
        let Stmt::Attribute(attr) = &stmts[0] else {
            panic!("expected attribute");
        };
        assert_eq!(attr.value, Literal::Str("a\t\"b\"\n".into()));
    }

    #[test]
    fn comments_between_statements() {
        let stmts = parse("a = 1 // trailing\n// whole line\nb = 2").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1].span(), Span::new(3, 1));
    }

    #[test]
    fn error_unexpected_char() {
        assert_eq!(
            parse("a = %"),
            Err(ParseError::UnexpectedChar {
                ch: '%',
                span: Span::new(1, 5)
            })
        );
    }

    #[test]
    fn error_unclosed_block() {
        assert_eq!(
            parse("outer {\n  a = 1\n"),
            Err(ParseError::UnexpectedEof {
                expected: "`}`",
                span: Span::new(3, 1)
            })
        );
    }

    #[test]
    fn error_bare_identifier() {
        assert!(matches!(
            parse("orphan"),
            Err(ParseError::UnexpectedEof {
                expected: "`=` or `{`",
                ..
            })
        ));
    }

    #[test]
    fn error_value_position() {
        assert_eq!(
            parse("a = {"),
            Err(ParseError::UnexpectedToken {
                found: "`{`",
                expected: "a literal value",
                span: Span::new(1, 5)
            })
        );
    }

    #[test]
    fn error_stray_close_brace() {
        assert_eq!(
            parse("}"),
            Err(ParseError::UnexpectedToken {
                found: "`}`",
                expected: "a statement",
                span: Span::new(1, 1)
            })
        );
    }

    #[test]
    fn error_unterminated_string() {
        assert_eq!(
            parse("s = \"oops"),
            Err(ParseError::UnterminatedString {
                span: Span::new(1, 5)
            })
        );
    }

    #[test]
    fn error_invalid_escape() {
        assert!(matches!(
            parse(r#"s = "a\q""#),
            Err(ParseError::InvalidEscape { ch: 'q', .. })
        ));
    }

    #[test]
    fn non_finite_floats_have_no_literal_form() {
        // `{:?}`-printed infinities and NaN are bare identifiers to the
        // lexer, so they never re-enter as numbers.
        assert!(matches!(
            parse("a = inf"),
            Err(ParseError::UnexpectedToken {
                found: "identifier",
                ..
            })
        ));
        assert!(matches!(
            parse("a = NaN"),
            Err(ParseError::UnexpectedToken {
                found: "identifier",
                ..
            })
        ));
    }

    #[test]
    fn error_lone_minus() {
        assert_eq!(
            parse("a = -"),
            Err(ParseError::InvalidNumber {
                span: Span::new(1, 5)
            })
        );
    }
}
