//! Tokenizer over comment-free text.
//!
//! Keywords (`type`, `extends`, `never`, ...) are not distinguished here;
//! they surface as plain identifiers and the grammar decides. String
//! escapes are resolved before storage so the AST only ever holds the
//! actual value.

use crate::error::{Error, Pos, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Lt,
    Gt,
    Comma,
    Semi,
    Colon,
    Question,
    Pipe,
    Eq,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("`{name}`"),
            TokenKind::Str(_) => "string literal".into(),
            TokenKind::Int(_) | TokenKind::Float(_) => "numeric literal".into(),
            TokenKind::Lt => "`<`".into(),
            TokenKind::Gt => "`>`".into(),
            TokenKind::Comma => "`,`".into(),
            TokenKind::Semi => "`;`".into(),
            TokenKind::Colon => "`:`".into(),
            TokenKind::Question => "`?`".into(),
            TokenKind::Pipe => "`|`".into(),
            TokenKind::Eq => "`=`".into(),
            TokenKind::LBracket => "`[`".into(),
            TokenKind::RBracket => "`]`".into(),
            TokenKind::LBrace => "`{`".into(),
            TokenKind::RBrace => "`}`".into(),
            TokenKind::LParen => "`(`".into(),
            TokenKind::RParen => "`)`".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    /// Char offset into the comment-free text; comparable with comment offsets.
    pub offset: usize,
}

pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Lexer::new(text).run()
}

struct Lexer {
    chars: Vec<char>,
    i: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Lexer { chars: text.chars().collect(), i: 0, line: 1, col: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
                continue;
            }
            let pos = self.pos();
            let offset = self.i;
            let kind = match c {
                '<' => self.single(TokenKind::Lt),
                '>' => self.single(TokenKind::Gt),
                ',' => self.single(TokenKind::Comma),
                ';' => self.single(TokenKind::Semi),
                ':' => self.single(TokenKind::Colon),
                '?' => self.single(TokenKind::Question),
                '|' => self.single(TokenKind::Pipe),
                '=' => self.single(TokenKind::Eq),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '"' | '\'' => self.string(pos)?,
                c if c.is_ascii_digit() || c == '.' => self.number(pos)?,
                '+' | '-' if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit() || d == '.') => {
                    self.number(pos)?
                }
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(Error::syntax(pos, format!("unexpected character `{other}`")));
                }
            };
            tokens.push(Token { kind, pos, offset });
        }
        tokens.push(Token { kind: TokenKind::Eof, pos: self.pos(), offset: self.i });
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn ident(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Ident(name)
    }

    fn number(&mut self, pos: Pos) -> Result<TokenKind> {
        let mut lexeme = String::new();
        let mut fractional = false;
        if matches!(self.peek(), Some('+') | Some('-')) {
            lexeme.push(self.advance().unwrap_or('+'));
        }
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    lexeme.push(c);
                    self.advance();
                }
                '.' if !fractional => {
                    fractional = true;
                    lexeme.push(c);
                    self.advance();
                }
                'e' | 'E' => {
                    fractional = true;
                    lexeme.push(c);
                    self.advance();
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        lexeme.push(self.advance().unwrap_or('+'));
                    }
                }
                _ => break,
            }
        }
        if fractional {
            lexeme
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| Error::syntax(pos, format!("malformed number `{lexeme}`")))
        } else {
            lexeme
                .parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| Error::syntax(pos, format!("malformed number `{lexeme}`")))
        }
    }

    fn string(&mut self, pos: Pos) -> Result<TokenKind> {
        let quote = self.advance().unwrap_or('"');
        let mut value = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(Error::syntax(pos, "unterminated string literal"));
            };
            if c == quote {
                return Ok(TokenKind::Str(value));
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            let escape_pos = self.pos();
            let Some(esc) = self.advance() else {
                return Err(Error::syntax(pos, "unterminated string literal"));
            };
            match esc {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                '\\' => value.push('\\'),
                '"' => value.push('"'),
                '\'' => value.push('\''),
                '/' => value.push('/'),
                'x' => value.push(self.hex_escape(escape_pos, 2)?),
                'u' => value.push(self.hex_escape(escape_pos, 4)?),
                other => {
                    return Err(Error::syntax(escape_pos, format!("invalid escape `\\{other}`")));
                }
            }
        }
    }

    fn hex_escape(&mut self, pos: Pos, digits: usize) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            let Some(c) = self.advance() else {
                return Err(Error::syntax(pos, "truncated escape sequence"));
            };
            let digit = c
                .to_digit(16)
                .ok_or_else(|| Error::syntax(pos, format!("invalid hex digit `{c}` in escape")))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| Error::syntax(pos, "escape is not a valid char"))
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuation_and_idents() {
        assert_eq!(
            kinds("type A=string;"),
            vec![
                TokenKind::Ident("type".into()),
                TokenKind::Ident("A".into()),
                TokenKind::Eq,
                TokenKind::Ident("string".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_split_int_vs_float() {
        assert_eq!(kinds("7"), vec![TokenKind::Int(7), TokenKind::Eof]);
        assert_eq!(kinds("-3"), vec![TokenKind::Int(-3), TokenKind::Eof]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Float(1.5), TokenKind::Eof]);
        assert_eq!(kinds("2e3"), vec![TokenKind::Float(2000.0), TokenKind::Eof]);
    }

    #[test]
    fn strings_unescape_both_quote_forms() {
        assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]);
        assert_eq!(kinds(r"'it\'s'"), vec![TokenKind::Str("it's".into()), TokenKind::Eof]);
        assert_eq!(kinds(r#""\u0041""#), vec![TokenKind::Str("A".into()), TokenKind::Eof]);
    }

    #[test]
    fn token_positions_are_line_and_column() {
        let tokens = tokenize("type A =\n  1;").unwrap();
        let one = tokens.iter().find(|t| t.kind == TokenKind::Int(1)).unwrap();
        assert_eq!(one.pos, Pos::new(2, 3));
    }

    #[test]
    fn bad_escape_is_a_syntax_error() {
        let err = tokenize(r#""\q""#).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn unterminated_string_reports_opening_quote() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err, Error::syntax(Pos::new(1, 1), "unterminated string literal"));
    }
}
