//! Lexer for the C++ subset.
//!
//! Produces tokens with character-offset ranges. Comments and whitespace are dropped. Preprocessor
//! lines never become tokens; `#include` lines are recorded separately for the binder.

use crate::ParseError;
use quickfix_syntax::{Include, Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#\s*include\s*([<"])([^>"]+)[>"]"#).expect("valid include regex")
});

/// Lexer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// `#include` directives in source order.
    pub includes: Vec<Include>,
}

/// Tokenize `source`.
pub fn lex(source: &str) -> Result<Lexed, ParseError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    at_line_start: bool,
    out: Lexed,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            at_line_start: true,
            out: Lexed::default(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let spelling = self.text(start, self.pos);
        self.out.tokens.push(Token::new(kind, start..self.pos, spelling));
        self.at_line_start = false;
    }

    fn run(mut self) -> Result<Lexed, ParseError> {
        while let Some(ch) = self.peek(0) {
            let start = self.pos;
            match ch {
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.at_line_start = true;
                }
                c if c.is_whitespace() => self.pos += 1,
                '/' if self.peek(1) == Some('/') => self.skip_line(),
                '/' if self.peek(1) == Some('*') => self.skip_block_comment()?,
                '#' if self.at_line_start => self.directive(),
                '"' => {
                    self.quoted('"', "string literal")?;
                    self.push(TokenKind::StringLiteral, start);
                }
                '\'' => {
                    self.quoted('\'', "character literal")?;
                    self.push(TokenKind::CharLiteral, start);
                }
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    self.number();
                    self.push(TokenKind::NumericLiteral, start);
                }
                c if c == '_' || c.is_alphabetic() => {
                    while self
                        .peek(0)
                        .is_some_and(|c| c == '_' || c.is_alphanumeric())
                    {
                        self.pos += 1;
                    }
                    let word = self.text(start, self.pos);
                    let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier);
                    self.push(kind, start);
                }
                _ => {
                    let kind = self.punctuator().ok_or(ParseError::UnexpectedChar {
                        ch,
                        offset: start,
                    })?;
                    self.push(kind, start);
                }
            }
        }

        tracing::trace!(tokens = self.out.tokens.len(), "lexed");
        Ok(self.out)
    }

    fn skip_line(&mut self) {
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => {
                    return Err(ParseError::Unterminated {
                        what: "block comment",
                        offset: start,
                    });
                }
                Some('*') if self.peek(1) == Some('/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
            }
        }
    }

    fn directive(&mut self) {
        let start = self.pos;
        let line = self.line;
        // Backslash-newline continues a directive.
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                if self.pos > start && self.chars[self.pos - 1] == '\\' {
                    self.line += 1;
                    self.pos += 1;
                    continue;
                }
                break;
            }
            self.pos += 1;
        }

        let text = self.text(start, self.pos);
        if let Some(caps) = INCLUDE.captures(&text) {
            self.out.includes.push(Include {
                path: caps[2].to_string(),
                angled: &caps[1] == "<",
                line,
                range: start..self.pos,
            });
        }
    }

    fn quoted(&mut self, quote: char, what: &'static str) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some('\n') => {
                    return Err(ParseError::Unterminated {
                        what,
                        offset: start,
                    });
                }
                Some('\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn number(&mut self) {
        let hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.pos += 1;
            } else if matches!(c, '+' | '-')
                && !hex
                && self
                    .pos
                    .checked_sub(1)
                    .is_some_and(|prev| matches!(self.chars[prev], 'e' | 'E'))
            {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn punctuator(&mut self) -> Option<TokenKind> {
        for len in [3, 2, 1] {
            if self.pos + len > self.chars.len() {
                continue;
            }
            let candidate = self.text(self.pos, self.pos + len);
            if let Some(kind) = TokenKind::punctuator(&candidate) {
                self.pos += len;
                return Some(kind);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a<=b>>=c::d"),
            vec![
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::GreaterGreaterEqual,
                TokenKind::Identifier,
                TokenKind::ColonColon,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_literals_and_suffixes() {
        let lexed = lex("x = 0x1Fu + 1e-3 + 'a' + \"s\\\"t\";").unwrap();
        let spellings: Vec<&str> = lexed.tokens.iter().map(|t| t.spelling.as_str()).collect();
        assert_eq!(
            spellings,
            vec!["x", "=", "0x1Fu", "+", "1e-3", "+", "'a'", "+", "\"s\\\"t\"", ";"]
        );
        assert_eq!(lexed.tokens[6].kind, TokenKind::CharLiteral);
    }

    #[test]
    fn test_comments_and_directives_are_skipped() {
        let source = "#include <QString>\n#include \"a.h\"\n// c\nint /* x */ y;\n#define X \\\n 1\n";
        let lexed = lex(source).unwrap();
        assert_eq!(lexed.tokens.len(), 3);
        assert_eq!(lexed.includes.len(), 2);
        assert_eq!(lexed.includes[0].path, "QString");
        assert!(lexed.includes[0].angled);
        assert_eq!(lexed.includes[1].line, 2);
        assert!(!lexed.includes[1].angled);
    }

    #[test]
    fn test_offsets_are_chars() {
        let lexed = lex("\"é\" x").unwrap();
        assert_eq!(lexed.tokens[0].range, 0..3);
        assert_eq!(lexed.tokens[1].range, 4..5);
    }

    #[test]
    fn test_errors_carry_offsets() {
        assert_eq!(
            lex("a $").unwrap_err(),
            ParseError::UnexpectedChar { ch: '$', offset: 2 }
        );
        assert_eq!(lex("x /* y").unwrap_err().offset(), 2);
        assert_eq!(lex("\"abc").unwrap_err().offset(), 0);
    }

    #[test]
    fn test_objc_at_string() {
        assert_eq!(
            kinds("@\"x\""),
            vec![TokenKind::At, TokenKind::StringLiteral]
        );
    }
}
