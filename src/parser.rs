//! Document parser.
//!
//! [`Parser`] pulls tokens from a [`Lexer`] and builds a [`Value`] tree. It is
//! an explicit state machine over a stack of open containers rather than a
//! recursive descent, so deeply nested input cannot exhaust the call stack;
//! nesting is bounded by [`ParseOptions::max_depth`] instead.
//!
//! Each step looks at exactly one token. The first violation ends the parse
//! with a single positioned [`Error`].
//!
//! ```rust
//! use nosj::{parse, Value};
//!
//! let value = parse(br#"{"a": [1, 2.50, "x"]}"#).unwrap();
//! assert_eq!(value.to_string(), r#"{"a":[1,2.50,"x"]}"#);
//!
//! let err = parse(b"[1 2]").unwrap_err();
//! assert!(err.to_string().starts_with("expected ',' or ']'"));
//! ```

use crate::lexer::{Lexer, Spanned, Token};
use crate::{DuplicateKeys, Error, Map, Number, ParseOptions, Position, Result, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Document root
    ExpectValue,
    InArrayExpectValueOrClose,
    /// After a comma
    InArrayExpectValue,
    InArrayExpectCommaOrClose,
    InObjectExpectKeyOrClose,
    /// After a comma
    InObjectExpectKey,
    InObjectExpectColon,
    InObjectExpectValue,
    InObjectExpectCommaOrClose,
    /// Root value complete, only whitespace may follow
    Done,
}

impl State {
    /// What the parser was waiting for, as shown in end-of-input errors.
    const fn expected(self) -> &'static str {
        match self {
            State::ExpectValue | State::InArrayExpectValue | State::InObjectExpectValue => {
                "a value"
            }
            State::InArrayExpectValueOrClose => "a value or ']'",
            State::InArrayExpectCommaOrClose => "',' or ']'",
            State::InObjectExpectKeyOrClose => "a string key or '}'",
            State::InObjectExpectKey => "a string key",
            State::InObjectExpectColon => "':'",
            State::InObjectExpectCommaOrClose => "',' or '}'",
            State::Done => "end of input",
        }
    }
}

/// An open container waiting for its closing token.
enum Frame {
    Array(Vec<Value>),
    Object {
        entries: Map,
        pending_key: Option<String>,
        // Only tracked when duplicates are rejected
        seen: Option<HashSet<String>>,
    },
}

/// Streaming parser over one input buffer.
///
/// A `Parser` is single use: [`Parser::parse`] consumes it.
///
/// # Examples
///
/// ```rust
/// use nosj::{Parser, ParseOptions};
///
/// let parser = Parser::new(b"[true, null]", &ParseOptions::default()).unwrap();
/// let value = parser.parse().unwrap();
/// assert_eq!(value.to_string(), "[true,null]");
/// ```
pub struct Parser<'a> {
    input: &'a [u8],
    lexer: Lexer<'a>,
    options: ParseOptions,
    state: State,
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`.
    ///
    /// # Errors
    ///
    /// Fails before reading any token if the input exceeds
    /// [`ParseOptions::max_input_size`].
    pub fn new(input: &'a [u8], options: &ParseOptions) -> Result<Self> {
        if let Some(limit) = options.max_input_size {
            if input.len() > limit {
                return Err(Error::InputTooLarge {
                    size: input.len(),
                    limit,
                });
            }
        }

        Ok(Parser {
            input,
            lexer: Lexer::new(input),
            options: options.clone(),
            state: State::ExpectValue,
            stack: Vec::new(),
        })
    }

    /// Runs the parse to completion.
    ///
    /// # Errors
    ///
    /// Returns the first lexical, grammar or resource error found.
    pub fn parse(mut self) -> Result<Value> {
        tracing::debug!(
            bytes = self.input.len(),
            max_depth = self.options.max_depth,
            duplicate_keys = self.options.duplicate_keys.as_str(),
            "parsing document"
        );

        let root = loop {
            let Some(Spanned { token, offset }) = self.lexer.next_token()? else {
                return Err(self.eof_error());
            };
            if let Some(root) = self.step(token, offset)? {
                break root;
            }
        };

        self.state = State::Done;
        self.finish(root)
    }

    fn position(&self, offset: usize) -> Position {
        Position::locate(self.input, offset)
    }

    fn syntax(&self, offset: usize, msg: &str) -> Error {
        Error::syntax(self.position(offset), msg)
    }

    fn unexpected(&self, offset: usize, expected: &str, found: &Token<'_>) -> Error {
        self.syntax(offset, &format!("expected {expected}, found {}", found.describe()))
    }

    fn eof_error(&self) -> Error {
        if self.state == State::ExpectValue {
            return Error::NoValue;
        }
        Error::unexpected_eof(self.position(self.input.len()), self.state.expected())
    }

    /// Only whitespace may follow the root value. Anything else is trailing
    /// data, whether or not it would lex.
    fn finish(mut self, root: Value) -> Result<Value> {
        let rest = self.lexer.position();
        match self.lexer.next_token() {
            Ok(None) => {
                tracing::debug!(kind = root.kind(), "parsed document");
                Ok(root)
            }
            Ok(Some(Spanned { offset, .. })) => Err(Error::trailing_data(self.position(offset))),
            Err(_) => {
                let offset = self.input[rest..]
                    .iter()
                    .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                    .map_or(self.input.len(), |i| rest + i);
                Err(Error::trailing_data(self.position(offset)))
            }
        }
    }

    /// Feeds one token to the state machine. Returns the root value once it
    /// is complete.
    fn step(&mut self, token: Token<'a>, offset: usize) -> Result<Option<Value>> {
        match self.state {
            State::ExpectValue | State::InArrayExpectValue | State::InObjectExpectValue => {
                match token {
                    Token::RightBracket if self.state == State::InArrayExpectValue => {
                        Err(self.syntax(offset, "trailing comma before ']'"))
                    }
                    token => self.value(token, offset),
                }
            }
            State::InArrayExpectValueOrClose => match token {
                Token::RightBracket => Ok(self.close()),
                token => self.value(token, offset),
            },
            State::InArrayExpectCommaOrClose => match token {
                Token::Comma => {
                    self.state = State::InArrayExpectValue;
                    Ok(None)
                }
                Token::RightBracket => Ok(self.close()),
                other => Err(self.unexpected(offset, "',' or ']' after array element", &other)),
            },
            State::InObjectExpectKeyOrClose => match token {
                Token::String(key) => self.key(key.into_owned(), offset),
                Token::RightBrace => Ok(self.close()),
                other => Err(self.unexpected(offset, "string key or '}'", &other)),
            },
            State::InObjectExpectKey => match token {
                Token::String(key) => self.key(key.into_owned(), offset),
                Token::RightBrace => Err(self.syntax(offset, "trailing comma before '}'")),
                other => Err(self.unexpected(offset, "string key", &other)),
            },
            State::InObjectExpectColon => match token {
                Token::Colon => {
                    self.state = State::InObjectExpectValue;
                    Ok(None)
                }
                other => Err(self.unexpected(offset, "':' after object key", &other)),
            },
            State::InObjectExpectCommaOrClose => match token {
                Token::Comma => {
                    self.state = State::InObjectExpectKey;
                    Ok(None)
                }
                Token::RightBrace => Ok(self.close()),
                other => Err(self.unexpected(offset, "',' or '}' after object member", &other)),
            },
            State::Done => Err(Error::trailing_data(self.position(offset))),
        }
    }

    /// Handles a token in value position: a scalar completes immediately,
    /// `[` and `{` open a new frame.
    fn value(&mut self, token: Token<'a>, offset: usize) -> Result<Option<Value>> {
        let scalar = match token {
            Token::LeftBracket => {
                self.open(Frame::Array(Vec::new()), offset)?;
                self.state = State::InArrayExpectValueOrClose;
                return Ok(None);
            }
            Token::LeftBrace => {
                let seen = (self.options.duplicate_keys == DuplicateKeys::Reject)
                    .then(HashSet::new);
                self.open(
                    Frame::Object {
                        entries: Map::new(),
                        pending_key: None,
                        seen,
                    },
                    offset,
                )?;
                self.state = State::InObjectExpectKeyOrClose;
                return Ok(None);
            }
            Token::Null => Value::Null,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Number(lexeme) => Value::Number(Number::from_lexeme(lexeme)),
            Token::String(s) => Value::String(s.into_owned()),
            other => return Err(self.unexpected(offset, "a value", &other)),
        };
        Ok(self.complete(scalar))
    }

    fn open(&mut self, frame: Frame, offset: usize) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            tracing::debug!(limit = self.options.max_depth, offset, "nesting too deep");
            return Err(Error::depth_limit(
                self.position(offset),
                self.options.max_depth,
            ));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn key(&mut self, key: String, offset: usize) -> Result<Option<Value>> {
        let duplicate = match self.stack.last_mut() {
            Some(Frame::Object {
                pending_key, seen, ..
            }) => {
                let duplicate = seen.as_mut().is_some_and(|seen| !seen.insert(key.clone()));
                if !duplicate {
                    *pending_key = Some(key);
                    None
                } else {
                    Some(key)
                }
            }
            _ => None,
        };

        if let Some(key) = duplicate {
            return Err(Error::duplicate_key(self.position(offset), &key));
        }
        self.state = State::InObjectExpectColon;
        Ok(None)
    }

    /// Pops the innermost frame and completes it as a value.
    fn close(&mut self) -> Option<Value> {
        let value = match self.stack.pop()? {
            Frame::Array(items) => Value::Array(items),
            Frame::Object { entries, .. } => match self.options.duplicate_keys {
                DuplicateKeys::LastWins => Value::Object(entries.collapse_duplicates()),
                DuplicateKeys::Preserve | DuplicateKeys::Reject => Value::Object(entries),
            },
        };
        self.complete(value)
    }

    /// Attaches a finished value to its parent, or returns it as the root.
    fn complete(&mut self, value: Value) -> Option<Value> {
        match self.stack.last_mut() {
            None => Some(value),
            Some(Frame::Array(items)) => {
                items.push(value);
                self.state = State::InArrayExpectCommaOrClose;
                None
            }
            Some(Frame::Object {
                entries,
                pending_key,
                ..
            }) => {
                entries.push(pending_key.take().unwrap_or_default(), value);
                self.state = State::InObjectExpectCommaOrClose;
                None
            }
        }
    }
}

/// Parses a complete document with default options.
///
/// # Errors
///
/// Returns the first lexical or grammar error in `input`.
pub fn parse(input: &[u8]) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parses a complete document.
///
/// # Errors
///
/// Returns the first lexical, grammar or resource error in `input`.
pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Value> {
    Parser::new(input, options)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    fn canon(input: &str) -> String {
        parse(input.as_bytes()).unwrap().to_string()
    }

    fn err(input: &str) -> Error {
        parse(input.as_bytes()).unwrap_err()
    }

    fn msg(input: &str) -> String {
        match err(input) {
            Error::Syntax { msg, .. } | Error::Lexical { msg, .. } => msg,
            other => other.to_string(),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse(b"null").unwrap(), Value::Null);
        assert_eq!(parse(b" true ").unwrap(), Value::Bool(true));
        assert_eq!(parse(b"false").unwrap(), Value::Bool(false));
        assert_eq!(parse(br#""hi""#).unwrap(), Value::from("hi"));
        assert_eq!(canon("-2.5E-3"), "-2.5e-3");
    }

    #[test]
    fn test_nested_containers() {
        assert_eq!(
            canon(r#" { "a" : [ 1 , { } , [ ] ] , "b" : { "c" : null } } "#),
            r#"{"a":[1,{},[]],"b":{"c":null}}"#
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(err(""), Error::NoValue);
        assert_eq!(err(" \n\t\r "), Error::NoValue);
    }

    #[test]
    fn test_trailing_data() {
        let e = err("{} x");
        assert!(matches!(e, Error::TrailingData { offset: 3, .. }));
        assert_eq!(e.category(), ErrorCategory::Grammar);
        assert!(matches!(err("{}tru"), Error::TrailingData { offset: 2, .. }));
        assert!(matches!(err("null @"), Error::TrailingData { offset: 5, .. }));
        assert!(matches!(err("[1] \"open"), Error::TrailingData { offset: 4, .. }));
        assert!(matches!(
            parse(b"null \n\xff").unwrap_err(),
            Error::TrailingData { line: 2, col: 1, offset: 6 }
        ));

        let e = err("[] []");
        assert!(matches!(e, Error::TrailingData { offset: 3, .. }));
        assert!(matches!(err("1 2"), Error::TrailingData { .. }));
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(msg("[1,]"), "trailing comma before ']'");
        assert_eq!(msg(r#"{"a":1,}"#), "trailing comma before '}'");
    }

    #[test]
    fn test_object_grammar_errors() {
        assert_eq!(msg(r#"{"a" 1}"#), "expected ':' after object key, found number");
        assert_eq!(msg("{1:2}"), "expected string key or '}', found number");
        assert_eq!(msg(r#"{"a":1 "b":2}"#), "expected ',' or '}' after object member, found string");
        assert_eq!(msg(r#"{"a":}"#), "expected a value, found '}'");
    }

    #[test]
    fn test_array_grammar_errors() {
        assert_eq!(msg("[1 2]"), "expected ',' or ']' after array element, found number");
        assert_eq!(msg("[,]"), "expected a value, found ','");
        assert_eq!(msg("[1}"), "expected ',' or ']' after array element, found '}'");
        assert_eq!(msg("]"), "expected a value, found ']'");
    }

    #[test]
    fn test_unexpected_eof() {
        match err("[1,") {
            Error::UnexpectedEof {
                expected, offset, ..
            } => {
                assert_eq!(expected, "a value");
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(err(r#"{"a""#), Error::UnexpectedEof { .. }));
        assert!(matches!(err("[[]"), Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_position() {
        let e = err("[\n  1,\n  ]");
        let pos = e.position().unwrap();
        assert_eq!((pos.line, pos.col, pos.offset), (3, 3, 9));
        assert_eq!(e.category(), ErrorCategory::Grammar);
    }

    #[test]
    fn test_duplicate_keys_preserved_by_default() {
        assert_eq!(canon(r#"{"a":1,"a":2}"#), r#"{"a":1,"a":2}"#);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let options = ParseOptions::new().with_duplicate_keys(DuplicateKeys::LastWins);
        let value = parse_with_options(br#"{"a":1,"b":2,"a":3}"#, &options).unwrap();
        assert_eq!(value.to_string(), r#"{"a":3,"b":2}"#);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let options = ParseOptions::strict();
        let e = parse_with_options(br#"{"a":1,"b":{"a":2},"a":3}"#, &options).unwrap_err();
        match e {
            Error::DuplicateKey { key, offset, .. } => {
                assert_eq!(key, "a");
                assert_eq!(offset, 19);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions::new().with_max_depth(2);
        assert!(parse_with_options(b"[[1]]", &options).is_ok());
        let e = parse_with_options(b"[[{}]]", &options).unwrap_err();
        assert!(matches!(e, Error::DepthLimit { limit: 2, offset: 2, .. }));
        assert_eq!(e.category(), ErrorCategory::Resource);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let e = parse(input.as_bytes()).unwrap_err();
        assert!(matches!(e, Error::DepthLimit { limit: 1024, .. }));
    }

    #[test]
    fn test_unbounded_depth_parses_and_drops() {
        let depth = 1_000_000;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let options = ParseOptions::new().with_max_depth(usize::MAX);
        let value = parse_with_options(input.as_bytes(), &options).unwrap();
        assert_eq!(value.to_string().len(), input.len());
        drop(value);

        let input = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
        let value = parse_with_options(input.as_bytes(), &options).unwrap();
        assert_eq!(value.to_string(), input);
    }

    #[test]
    fn test_error_inside_deep_document_unwinds() {
        let input = format!("{}x", "[".repeat(1_000_000));
        let options = ParseOptions::new().with_max_depth(usize::MAX);
        let e = parse_with_options(input.as_bytes(), &options).unwrap_err();
        assert_eq!(e.category(), ErrorCategory::Lexical);
    }

    #[test]
    fn test_earlier_grammar_error_beats_later_bad_utf8() {
        let e = parse(b"[1,]\xff").unwrap_err();
        assert!(matches!(e, Error::Syntax { offset: 3, .. }));
    }

    #[test]
    fn test_input_size_limit() {
        let options = ParseOptions::new().with_max_input_size(4);
        assert!(parse_with_options(b"null", &options).is_ok());
        let e = parse_with_options(b"[null]", &options).unwrap_err();
        assert_eq!(e, Error::InputTooLarge { size: 6, limit: 4 });
    }
}
