//! # nosj
//!
//! A strict deserializer for a JSON-like document format, with exactly one
//! canonical way to write every document back out.
//!
//! ## What is nosj?
//!
//! nosj documents use the familiar JSON grammar, with none of the leniency
//! many JSON parsers allow: no comments, no trailing commas, no leading
//! zeros, no unescaped control characters, no unpaired surrogates and
//! nothing after the top-level value. Anything outside the grammar is
//! rejected with a single diagnostic that names the line, column and byte
//! offset of the first problem.
//!
//! A document that parses has one canonical serialization: no whitespace,
//! entries in source order, minimal string escaping and numbers kept digit
//! for digit (only the exponent is normalized). Re-parsing canonical output
//! always gives the same text again.
//!
//! ## Key Features
//!
//! - **Strict**: Every deviation from the grammar is an error, never a guess
//! - **Lossless numbers**: Numbers keep their source digits, so `1.50` and
//!   `123456789012345678901234567890` survive unchanged
//! - **Stack-safe**: The parser and serializer use explicit stacks, and
//!   nesting is bounded by a configurable depth limit
//! - **Serde Compatible**: Read typed data out of a document with
//!   `#[derive(Deserialize)]`, or build documents from `#[derive(Serialize)]`
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use nosj::parse;
//!
//! let value = parse(b"{ \"a\" : [ 1 , 2.50 , -3E+02 ] }").unwrap();
//! assert_eq!(value.to_string(), r#"{"a":[1,2.50,-3e2]}"#);
//!
//! let err = parse(b"[1, 2,]").unwrap_err();
//! assert_eq!(err.to_string(), "trailing comma before ']' at line 1, column 7 (byte 6)");
//! ```
//!
//! ### Typed data
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use nosj::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user: User = from_str(r#"{"id": 123, "name": "Alice", "active": true}"#).unwrap();
//! assert_eq!(to_string(&user).unwrap(), r#"{"id":123,"name":"Alice","active":true}"#);
//! ```
//!
//! ### Dynamic Values with the nosj! Macro
//!
//! ```rust
//! use nosj::{nosj, Value};
//!
//! let data = nosj!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["rust", "serde"]
//! });
//!
//! assert_eq!(data.get("name").and_then(Value::as_str), Some("Alice"));
//! ```
//!
//! ## Duplicate keys
//!
//! By default an object keeps every entry, so `{"a":1,"a":2}` round-trips
//! unchanged. [`ParseOptions::with_duplicate_keys`] selects
//! [`DuplicateKeys::LastWins`] or [`DuplicateKeys::Reject`] instead.
//!
//! ## Command line
//!
//! The `nosj_deserializer` binary parses one file and prints its canonical
//! form. On failure it prints one line starting with `ERROR -- ` to stderr
//! and exits with status 66.

pub mod de;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod number;
pub mod options;
pub mod parser;
pub mod ser;
pub mod value;

pub use de::from_value;
pub use error::{Error, ErrorCategory, Position, Result};
pub use lexer::{Lexer, Spanned, Token};
pub use map::Map;
pub use number::Number;
pub use options::{DuplicateKeys, ParseOptions, DEFAULT_MAX_DEPTH};
pub use parser::{parse, parse_with_options, Parser};
pub use ser::{to_value, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to its canonical text.
///
/// # Examples
///
/// ```rust
/// use nosj::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), r#"{"x":1,"y":2}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented (for example, a map
/// with non-string keys).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(ser::to_canonical_string(&to_value(value)?))
}

/// Serialize any `T: Serialize` to a writer as canonical text.
///
/// # Examples
///
/// ```rust
/// use nosj::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1, 2, 3]).unwrap();
/// assert_eq!(buffer, b"[1,2,3]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    ser::write_canonical(writer, &to_value(value)?)
}

/// Deserialize an instance of type `T` from nosj text.
///
/// The text is parsed strictly with default options before any conversion.
///
/// # Examples
///
/// ```rust
/// use nosj::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str(r#"{"x": 1, "y": 2}"#).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns a positioned error if the text is not a valid document, or a
/// data error if it cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes())
}

/// Deserialize an instance of type `T` from bytes of nosj text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not a valid document,
/// or cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse(v)?)
}

/// Deserialize an instance of type `T` from an I/O stream of nosj text.
///
/// The whole stream is read before parsing starts.
///
/// # Examples
///
/// ```rust
/// use nosj::from_reader;
/// use std::io::Cursor;
///
/// let numbers: Vec<u8> = from_reader(Cursor::new(b"[1, 2, 3]")).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not a
/// valid document, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice(&bytes)
}
