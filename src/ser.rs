//! Canonical serialization.
//!
//! This module renders a [`Value`] tree in its single canonical text form and
//! provides [`ValueSerializer`], which turns any `T: Serialize` into a
//! [`Value`].
//!
//! ## Canonical form
//!
//! - No whitespace between tokens, no trailing newline
//! - Object entries and array elements in stored order
//! - Numbers as their canonical text (see [`crate::number`])
//! - Strings escape `"`, `\` and control characters only
//!
//! ```rust
//! use nosj::{parse, ser::to_canonical_string};
//!
//! let value = parse(b" { \"b\" : [ 1E+05 , \"a/b\" ] } ").unwrap();
//! assert_eq!(to_canonical_string(&value), r#"{"b":[1e5,"a/b"]}"#);
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use nosj::{ValueSerializer, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let value = Data { x: 1, y: 2 }.serialize(ValueSerializer).unwrap();
//! assert_eq!(value.to_string(), r#"{"x":1,"y":2}"#);
//! ```

use crate::{Error, Map, Result, Value};
use serde::{ser, Serialize};
use std::fmt;
use std::io;

/// An open container whose remaining children have not been written yet.
enum Pending<'v> {
    Array {
        items: std::slice::Iter<'v, Value>,
        first: bool,
    },
    Object {
        entries: std::slice::Iter<'v, (String, Value)>,
        first: bool,
    },
}

/// Writes the canonical form of `value` to a formatter-like sink.
///
/// Containers are walked with an explicit stack, so output depth is not
/// limited by the call stack.
pub(crate) fn write_value<W: fmt::Write>(out: &mut W, value: &Value) -> fmt::Result {
    let mut stack: Vec<Pending<'_>> = Vec::new();
    let mut next = Some(value);

    loop {
        if let Some(value) = next.take() {
            match value {
                Value::Null => out.write_str("null")?,
                Value::Bool(true) => out.write_str("true")?,
                Value::Bool(false) => out.write_str("false")?,
                Value::Number(n) => out.write_str(n.as_str())?,
                Value::String(s) => write_string(out, s)?,
                Value::Array(items) => {
                    out.write_char('[')?;
                    stack.push(Pending::Array {
                        items: items.iter(),
                        first: true,
                    });
                }
                Value::Object(map) => {
                    out.write_char('{')?;
                    stack.push(Pending::Object {
                        entries: map.iter(),
                        first: true,
                    });
                }
            }
        }

        let Some(top) = stack.last_mut() else {
            return Ok(());
        };
        match top {
            Pending::Array { items, first } => match items.next() {
                Some(item) => {
                    if !std::mem::take(first) {
                        out.write_char(',')?;
                    }
                    next = Some(item);
                }
                None => {
                    out.write_char(']')?;
                    stack.pop();
                }
            },
            Pending::Object { entries, first } => match entries.next() {
                Some((key, item)) => {
                    if !std::mem::take(first) {
                        out.write_char(',')?;
                    }
                    write_string(out, key)?;
                    out.write_char(':')?;
                    next = Some(item);
                }
                None => {
                    out.write_char('}')?;
                    stack.pop();
                }
            },
        }
    }
}

/// Writes `s` as a quoted string.
///
/// Unescaped runs are copied in one piece; every escape falls on an ASCII
/// byte, so slicing between them stays on character boundaries.
fn write_string<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut run = 0;
    for (i, b) in s.bytes().enumerate() {
        let short = match b {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => "",
            _ => continue,
        };
        if run < i {
            out.write_str(&s[run..i])?;
        }
        if short.is_empty() {
            write!(out, "\\u{:04x}", b)?;
        } else {
            out.write_str(short)?;
        }
        run = i + 1;
    }
    if run < s.len() {
        out.write_str(&s[run..])?;
    }
    out.write_char('"')
}

/// Renders `value` in canonical form.
///
/// # Examples
///
/// ```rust
/// use nosj::{nosj, ser::to_canonical_string};
///
/// let value = nosj!({"tab": "a\tb", "list": [null, false]});
/// assert_eq!(to_canonical_string(&value), r#"{"tab":"a\tb","list":[null,false]}"#);
/// ```
#[must_use]
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::with_capacity(128);
    // Writing into a String cannot fail.
    let _ = write_value(&mut out, value);
    out
}

/// Bridges [`fmt::Write`] onto an [`io::Write`], keeping the first I/O error.
struct IoWriter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoWriter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

/// Writes the canonical form of `value` to `writer`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the writer fails.
pub fn write_canonical<W: io::Write>(writer: W, value: &Value) -> Result<()> {
    let mut sink = IoWriter {
        inner: writer,
        error: None,
    };
    write_value(&mut sink, value).map_err(|_| match sink.error.take() {
        Some(e) => Error::from(e),
        None => Error::io("formatter error"),
    })?;
    sink.inner.flush()?;
    Ok(())
}

/// A serde `Serializer` whose output is a [`Value`].
///
/// Enum variants carrying data become single-entry objects keyed by the
/// variant name. Non-finite floats become `Null`. Map keys must serialize
/// to strings.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

/// Collects a tuple variant's fields under its variant name.
pub struct SerializeTupleVariant {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<String>,
}

/// Collects a struct variant's fields under its variant name.
pub struct SerializeStructVariant {
    name: &'static str,
    map: Map,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = Map::with_capacity(1);
        map.push(variant.to_string(), to_value(value)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: Map::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant,
            map: Map::with_capacity(len),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::with_capacity(1);
        map.push(self.name.to_string(), Value::Array(self.vec));
        Ok(Value::Object(map))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(ref mut s) => {
                self.current_key = Some(std::mem::take(s));
                Ok(())
            }
            other => Err(Error::custom(format!(
                "map keys must be strings, found {}",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.push(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.push(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.push(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut outer = Map::with_capacity(1);
        outer.push(self.name.to_string(), Value::Object(self.map));
        Ok(Value::Object(outer))
    }
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// # Errors
///
/// Returns an error if `T`'s `Serialize` impl fails or produces a map with
/// non-string keys.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}
