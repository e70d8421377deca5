//! Error types for nosj parsing and serialization.
//!
//! Every failure the crate can produce is an [`Error`]. Parsing stops at the
//! first problem, so a failed parse carries exactly one error.
//!
//! ## Error Categories
//!
//! - **Lexical**: a malformed token (bad escape, unterminated string, malformed
//!   number, a byte that cannot start a token, invalid UTF-8)
//! - **Grammar**: a token sequence the document grammar does not allow
//!   (unexpected token, unexpected end of input, trailing data, duplicate key
//!   under [`DuplicateKeys::Reject`](crate::DuplicateKeys::Reject))
//! - **Resource**: nesting depth or input size over the configured limit
//! - **I/O** and **Data**: reader/writer failures and serde conversion errors
//!
//! ## Positions
//!
//! Input-related errors carry a 1-based line, a 1-based column counted in
//! characters, and the 0-based byte offset of the offending token.
//!
//! ```rust
//! use nosj::{parse, ErrorCategory};
//!
//! let err = parse(b"[1,2,]").unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Grammar);
//! assert_eq!(err.position().map(|p| p.col), Some(6));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents every error that can occur while parsing or serializing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed token
    #[error("{msg} at line {line}, column {col} (byte {offset})")]
    Lexical {
        line: usize,
        col: usize,
        offset: usize,
        msg: String,
    },

    /// Token sequence rejected by the grammar
    #[error("{msg} at line {line}, column {col} (byte {offset})")]
    Syntax {
        line: usize,
        col: usize,
        offset: usize,
        msg: String,
    },

    /// Input ended inside a value
    #[error("unexpected end of input at line {line}, column {col} (byte {offset}): expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        offset: usize,
        expected: String,
    },

    /// Non-whitespace content after the top-level value
    #[error("trailing data at line {line}, column {col} (byte {offset})")]
    TrailingData {
        line: usize,
        col: usize,
        offset: usize,
    },

    /// Empty or whitespace-only input
    #[error("no value found")]
    NoValue,

    /// Repeated object key while duplicates are rejected
    #[error("duplicate key {key:?} at line {line}, column {col} (byte {offset})")]
    DuplicateKey {
        line: usize,
        col: usize,
        offset: usize,
        key: String,
    },

    /// Arrays and objects nested deeper than the configured limit
    #[error("nesting depth exceeds limit of {limit} at line {line}, column {col} (byte {offset})")]
    DepthLimit {
        line: usize,
        col: usize,
        offset: usize,
        limit: usize,
    },

    /// Input larger than the configured limit
    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error raised through serde
    #[error("{0}")]
    Custom(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Grammar,
    Resource,
    Io,
    Data,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Lexical => "lexical",
            ErrorCategory::Grammar => "grammar",
            ErrorCategory::Resource => "resource",
            ErrorCategory::Io => "io",
            ErrorCategory::Data => "data",
        })
    }
}

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub col: usize,
    /// 0-based byte offset
    pub offset: usize,
}

impl Position {
    /// Resolves a byte offset in `input` to a line and column.
    ///
    /// Offsets past the end of the input resolve to the position just after
    /// the last byte.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::Position;
    ///
    /// let pos = Position::locate(b"[1,\n  x]", 6);
    /// assert_eq!((pos.line, pos.col), (2, 3));
    /// ```
    #[must_use]
    pub fn locate(input: &[u8], offset: usize) -> Self {
        let end = offset.min(input.len());
        let mut line = 1;
        let mut col = 1;
        for &b in &input[..end] {
            if b == b'\n' {
                line += 1;
                col = 1;
            } else if b & 0xC0 != 0x80 {
                // UTF-8 continuation bytes do not start a new character
                col += 1;
            }
        }
        Position { line, col, offset }
    }
}

impl Error {
    /// Creates a lexical error at the given position.
    pub fn lexical(pos: Position, msg: &str) -> Self {
        Error::Lexical {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            msg: msg.to_string(),
        }
    }

    /// Creates a grammar error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::{Error, Position};
    ///
    /// let pos = Position { line: 3, col: 7, offset: 20 };
    /// let err = Error::syntax(pos, "expected ':' after object key");
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// ```
    pub fn syntax(pos: Position, msg: &str) -> Self {
        Error::Syntax {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(pos: Position, expected: &str) -> Self {
        Error::UnexpectedEof {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            expected: expected.to_string(),
        }
    }

    pub fn trailing_data(pos: Position) -> Self {
        Error::TrailingData {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
        }
    }

    pub fn duplicate_key(pos: Position, key: &str) -> Self {
        Error::DuplicateKey {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            key: key.to_string(),
        }
    }

    pub fn depth_limit(pos: Position, limit: usize) -> Self {
        Error::DepthLimit {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            limit,
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert_eq!(err.to_string(), "something went wrong");
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Error::Lexical { .. } => ErrorCategory::Lexical,
            Error::Syntax { .. }
            | Error::UnexpectedEof { .. }
            | Error::TrailingData { .. }
            | Error::NoValue
            | Error::DuplicateKey { .. } => ErrorCategory::Grammar,
            Error::DepthLimit { .. } | Error::InputTooLarge { .. } => ErrorCategory::Resource,
            Error::Io(_) => ErrorCategory::Io,
            Error::Custom(_) => ErrorCategory::Data,
        }
    }

    /// Returns where in the input the error was detected, if it is tied to one.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match *self {
            Error::Lexical {
                line, col, offset, ..
            }
            | Error::Syntax {
                line, col, offset, ..
            }
            | Error::UnexpectedEof {
                line, col, offset, ..
            }
            | Error::TrailingData { line, col, offset }
            | Error::DuplicateKey {
                line, col, offset, ..
            }
            | Error::DepthLimit {
                line, col, offset, ..
            } => Some(Position { line, col, offset }),
            Error::NoValue | Error::InputTooLarge { .. } | Error::Io(_) | Error::Custom(_) => {
                None
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_counts_lines_and_chars() {
        let input = "{\"a\":\n  \"é\", x}".as_bytes();
        let offset = input.iter().position(|&b| b == b'x').unwrap();
        let pos = Position::locate(input, offset);
        assert_eq!(pos.line, 2);
        // `é` is two bytes but one column
        assert_eq!(pos.col, 8);
        assert_eq!(pos.offset, offset);
    }

    #[test]
    fn test_locate_past_end() {
        let pos = Position::locate(b"ab", 10);
        assert_eq!((pos.line, pos.col), (1, 3));
    }

    #[test]
    fn test_categories() {
        let pos = Position::default();
        assert_eq!(Error::lexical(pos, "x").category(), ErrorCategory::Lexical);
        assert_eq!(Error::NoValue.category(), ErrorCategory::Grammar);
        assert_eq!(Error::trailing_data(pos).category(), ErrorCategory::Grammar);
        assert_eq!(
            Error::depth_limit(pos, 4).category(),
            ErrorCategory::Resource
        );
        assert_eq!(
            Error::InputTooLarge { size: 9, limit: 8 }.category(),
            ErrorCategory::Resource
        );
        assert_eq!(Error::io("gone").category(), ErrorCategory::Io);
        assert_eq!(Error::custom("x").category(), ErrorCategory::Data);
    }

    #[test]
    fn test_display_includes_position() {
        let pos = Position {
            line: 2,
            col: 5,
            offset: 9,
        };
        let err = Error::unexpected_eof(pos, "']'");
        assert_eq!(
            err.to_string(),
            "unexpected end of input at line 2, column 5 (byte 9): expected ']'"
        );
        assert_eq!(err.position(), Some(pos));
        assert_eq!(Error::NoValue.position(), None);
    }

    #[test]
    fn test_duplicate_key_message_quotes_key() {
        let err = Error::duplicate_key(Position::default(), "a\"b");
        assert!(err.to_string().starts_with("duplicate key \"a\\\"b\""));
    }
}
