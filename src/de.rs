//! Deserialization from a parsed [`Value`].
//!
//! `Value` implements [`serde::Deserializer`], so any `T: Deserialize` can be
//! read out of a parsed document. Text input goes through the strict parser
//! first; see [`crate::from_str`] and friends.
//!
//! ## Usage
//!
//! ```rust
//! use nosj::{from_value, parse};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, tags: Vec<String> }
//!
//! let value = parse(br#"{"x": 1, "tags": ["a", "b"]}"#).unwrap();
//! let data: Data = from_value(value).unwrap();
//! assert_eq!(data, Data { x: 1, tags: vec!["a".into(), "b".into()] });
//! ```
//!
//! ## Enums
//!
//! Unit variants are read from strings. Variants with data are read from a
//! single-entry object keyed by the variant name, the same shape
//! [`crate::ValueSerializer`] produces.

use crate::{Error, Map, Number, Result, Value};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::mem;

/// Deserializes an instance of `T` from a [`Value`].
///
/// # Errors
///
/// Returns [`Error::Custom`] if the value does not have the shape `T` expects.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(value)
}

fn visit_number<'de, V>(n: &Number, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    if let Some(i) = n.as_i64() {
        visitor.visit_i64(i)
    } else if let Some(u) = n.as_u64() {
        visitor.visit_u64(u)
    } else {
        visitor.visit_f64(n.as_f64())
    }
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // `Value` implements `Drop`, so contents are taken rather than moved out
        match &mut self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => visit_number(n, visitor),
            Value::String(s) => visitor.visit_string(mem::take(s)),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(mem::take(arr))),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(mem::take(obj))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        mut self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &mut self {
            Value::String(variant) => {
                visitor.visit_enum(EnumDeserializer::new(mem::take(variant), None))
            }
            Value::Object(obj) if obj.len() == 1 => {
                let mut entries = mem::take(obj).into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, Some(value)))
                    }
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            other => Err(Error::custom(format!(
                "expected string or single-entry object for enum, found {}",
                other.kind()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Feeds object entries in source order; repeated keys reach the visitor
/// once per occurrence.
struct MapDeserializer {
    iter: std::vec::IntoIter<(String, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Value::String(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Value::String(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(Error::custom(format!(
                "expected unit variant, found {}",
                other.kind()
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(mut self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(ref mut arr)) => {
                visitor.visit_seq(SeqDeserializer::new(mem::take(arr)))
            }
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(mut self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(ref mut obj)) => {
                visitor.visit_map(MapDeserializer::new(mem::take(obj)))
            }
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, to_value};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        email: Option<String>,
        scores: Vec<f64>,
    }

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    enum Event {
        Ping,
        Move(i32),
        Resize(u32, u32),
        Rename { from: String, to: String },
    }

    fn value(text: &str) -> Value {
        parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_struct() {
        let user: User =
            from_value(value(r#"{"id":7,"name":"Ann","email":null,"scores":[1,2.5]}"#)).unwrap();
        assert_eq!(
            user,
            User {
                id: 7,
                name: "Ann".to_string(),
                email: None,
                scores: vec![1.0, 2.5],
            }
        );
    }

    #[test]
    fn test_missing_field_and_wrong_type() {
        assert!(from_value::<User>(value(r#"{"id":7}"#)).is_err());
        assert!(from_value::<User>(value(r#"{"id":"7","name":"x","email":null,"scores":[]}"#)).is_err());
        assert!(from_value::<u8>(value("300")).is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(from_value::<i64>(value("-0")).unwrap(), 0);
        assert_eq!(from_value::<u64>(value("18446744073709551615")).unwrap(), u64::MAX);
        assert_eq!(from_value::<i32>(value("1.5e1")).unwrap(), 15);
        assert_eq!(from_value::<f64>(value("2.5E-1")).unwrap(), 0.25);
    }

    #[test]
    fn test_enums() {
        assert_eq!(from_value::<Event>(value(r#""Ping""#)).unwrap(), Event::Ping);
        assert_eq!(from_value::<Event>(value(r#"{"Move":-3}"#)).unwrap(), Event::Move(-3));
        assert_eq!(
            from_value::<Event>(value(r#"{"Resize":[4,5]}"#)).unwrap(),
            Event::Resize(4, 5)
        );
        assert_eq!(
            from_value::<Event>(value(r#"{"Rename":{"from":"a","to":"b"}}"#)).unwrap(),
            Event::Rename {
                from: "a".to_string(),
                to: "b".to_string()
            }
        );
        assert!(from_value::<Event>(value("[1]")).is_err());
    }

    #[test]
    fn test_enum_round_trip_through_value() {
        let events = vec![
            Event::Ping,
            Event::Move(1),
            Event::Resize(2, 3),
            Event::Rename {
                from: "x".to_string(),
                to: "y".to_string(),
            },
        ];
        let back: Vec<Event> = from_value(to_value(&events).unwrap()).unwrap();
        assert_eq!(back, events);
    }

    #[test]
    fn test_duplicate_keys_reach_map_last_wins() {
        let map: HashMap<String, i32> = from_value(value(r#"{"a":1,"a":2}"#)).unwrap();
        assert_eq!(map.get("a"), Some(&2));
    }

    #[test]
    fn test_value_into_value() {
        let original = value(r#"{"k":[true,null,"s",1.50]}"#);
        let copy: Value = from_value(original.clone()).unwrap();
        // 1.50 decodes through f64, so the copy carries the shortest text
        assert_eq!(copy.to_string(), r#"{"k":[true,null,"s",1.5]}"#);
    }
}
