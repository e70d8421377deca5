//! Tokenizer for nosj documents.
//!
//! The [`Lexer`] turns raw input into a lazy stream of [`Spanned`] tokens.
//! Tokens are scanned directly from the bytes. UTF-8 is validated as each
//! token is read, so an earlier grammar error is reported before a bad byte
//! further on.
//!
//! Strings without escape sequences and all number lexemes are borrowed
//! from the input.
//!
//! ```rust
//! use nosj::{Lexer, Token};
//!
//! let tokens: Vec<_> = Lexer::new(br#"{"a": [1, true]}"#)
//!     .map(|t| t.unwrap().token)
//!     .collect();
//!
//! assert_eq!(tokens[0], Token::LeftBrace);
//! assert_eq!(tokens[1], Token::String("a".into()));
//! assert_eq!(tokens[4], Token::Number("1"));
//! assert_eq!(tokens.len(), 9);
//! ```

use crate::number;
use crate::{Error, Position, Result};
use std::borrow::Cow;
use std::fmt;

/// Lexical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Left brace `{`
    LeftBrace,
    /// Right brace `}`
    RightBrace,
    /// Left bracket `[`
    LeftBracket,
    /// Right bracket `]`
    RightBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    /// String contents with escapes decoded
    String(Cow<'a, str>),
    /// Raw number lexeme, already checked against the number grammar
    Number(&'a str),
}

impl Token<'_> {
    /// Short description used in diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Token::LeftBrace => "'{'",
            Token::RightBrace => "'}'",
            Token::LeftBracket => "'['",
            Token::RightBracket => "']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::Null => "'null'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::String(_) => "string",
            Token::Number(_) => "number",
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub offset: usize,
}

/// Lazy tokenizer over a byte buffer.
///
/// Once a lexical error has been returned the lexer is exhausted: both
/// [`Lexer::next_token`] and the [`Iterator`] impl yield nothing further.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    ///
    /// Invalid UTF-8 is reported by [`Lexer::next_token`] when the token
    /// containing it is read.
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        Lexer {
            input,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next unread character.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn error_at(&mut self, offset: usize, msg: &str) -> Error {
        self.failed = true;
        Error::lexical(Position::locate(self.input, offset), msg)
    }

    /// Borrows `start..end` as text.
    fn text(&mut self, start: usize, end: usize) -> Result<&'a str> {
        let input = self.input;
        match std::str::from_utf8(&input[start..end]) {
            Ok(text) => Ok(text),
            Err(e) => Err(self.error_at(start + e.valid_up_to(), "invalid UTF-8 sequence")),
        }
    }

    /// Error for a byte that cannot start a token.
    fn unexpected_character(&mut self, offset: usize) -> Error {
        let input = self.input;
        let window = &input[offset..input.len().min(offset + 4)];
        let valid = match std::str::from_utf8(window) {
            Ok(text) => text,
            Err(e) => std::str::from_utf8(&window[..e.valid_up_to()]).unwrap_or_default(),
        };
        match valid.chars().next() {
            Some(ch) => self.error_at(offset, &format!("unexpected character {:?}", ch)),
            None => self.error_at(offset, "invalid UTF-8 sequence"),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Reads the next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a lexical error for a malformed token. Every later call
    /// returns `Ok(None)`.
    pub fn next_token(&mut self) -> Result<Option<Spanned<'a>>> {
        if self.failed {
            return Ok(None);
        }
        self.skip_whitespace();

        let offset = self.pos;
        let Some(b) = self.peek() else {
            return Ok(None);
        };

        let token = match b {
            b'{' => self.punct(Token::LeftBrace),
            b'}' => self.punct(Token::RightBrace),
            b'[' => self.punct(Token::LeftBracket),
            b']' => self.punct(Token::RightBracket),
            b':' => self.punct(Token::Colon),
            b',' => self.punct(Token::Comma),
            b'"' => self.read_string()?,
            b'-' | b'0'..=b'9' => self.read_number()?,
            b't' => self.read_literal("true", Token::True)?,
            b'f' => self.read_literal("false", Token::False)?,
            b'n' => self.read_literal("null", Token::Null)?,
            _ => return Err(self.unexpected_character(offset)),
        };

        Ok(Some(Spanned { token, offset }))
    }

    fn punct(&mut self, token: Token<'a>) -> Token<'a> {
        self.pos += 1;
        token
    }

    fn read_literal(&mut self, word: &str, token: Token<'a>) -> Result<Token<'a>> {
        if self.input[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(token)
        } else {
            Err(self.error_at(self.pos, "invalid literal"))
        }
    }

    fn read_number(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        match number::scan(self.input, start) {
            Ok(end) => {
                self.pos = end;
                Ok(Token::Number(self.text(start, end)?))
            }
            Err((at, msg)) => Err(self.error_at(at, msg)),
        }
    }

    fn read_string(&mut self) -> Result<Token<'a>> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;

        // Fast path: no escapes means the contents can be borrowed.
        loop {
            match self.peek() {
                None => return Err(self.error_at(open, "unterminated string")),
                Some(b'"') => {
                    let text = self.text(start, self.pos)?;
                    self.pos += 1;
                    return Ok(Token::String(Cow::Borrowed(text)));
                }
                Some(b'\\') => break,
                Some(b) if b < 0x20 => {
                    return Err(self.error_at(self.pos, "control character in string"))
                }
                Some(_) => self.pos += 1,
            }
        }

        let mut out = String::with_capacity(self.pos - start + 16);
        out.push_str(self.text(start, self.pos)?);
        let mut run = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.error_at(open, "unterminated string")),
                Some(b'"') => {
                    out.push_str(self.text(run, self.pos)?);
                    self.pos += 1;
                    return Ok(Token::String(Cow::Owned(out)));
                }
                Some(b'\\') => {
                    out.push_str(self.text(run, self.pos)?);
                    let ch = self.read_escape()?;
                    out.push(ch);
                    run = self.pos;
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error_at(self.pos, "control character in string"))
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Decodes one escape sequence; `self.pos` is at the backslash.
    fn read_escape(&mut self) -> Result<char> {
        let backslash = self.pos;
        self.pos += 1;
        let ch = match self.peek() {
            None => return Err(self.error_at(backslash, "unterminated string")),
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{0008}',
            Some(b'f') => '\u{000C}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.pos += 1;
                return self.read_unicode_escape(backslash);
            }
            Some(_) => return Err(self.error_at(backslash, "invalid escape sequence")),
        };
        self.pos += 1;
        Ok(ch)
    }

    /// Decodes `XXXX` (and a trailing low surrogate escape if needed).
    fn read_unicode_escape(&mut self, backslash: usize) -> Result<char> {
        let high = self.read_hex4(backslash)?;

        let code = match high {
            0xD800..=0xDBFF => {
                if !self.input[self.pos..].starts_with(b"\\u") {
                    return Err(self.error_at(backslash, "unpaired surrogate in unicode escape"));
                }
                let second = self.pos;
                self.pos += 2;
                let low = self.read_hex4(second)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error_at(backslash, "unpaired surrogate in unicode escape"));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error_at(backslash, "unpaired surrogate in unicode escape"))
            }
            _ => high,
        };

        match char::from_u32(code) {
            Some(ch) => Ok(ch),
            None => Err(self.error_at(backslash, "invalid unicode escape")),
        }
    }

    fn read_hex4(&mut self, escape_start: usize) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.error_at(escape_start, "invalid unicode escape")),
            };
            value = (value << 4) | u32::from(digit);
            self.pos += 1;
        }
        Ok(value)
    }
}

impl<'a> From<&'a str> for Lexer<'a> {
    fn from(input: &'a str) -> Self {
        Lexer::new(input.as_bytes())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
