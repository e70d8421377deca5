//! Ordered entry list for nosj objects.
//!
//! This module provides [`Map`], the storage behind [`Value::Object`]. Unlike a
//! hash map it keeps every entry in source order, including repeated keys, so
//! the canonical output can reproduce the document exactly.
//!
//! Lookups follow the usual "last one wins" reading of duplicate keys. When a
//! deduplicated view is needed, [`Map::collapse_duplicates`] folds repeated
//! keys through an [`IndexMap`]: the entry stays at its first position and
//! takes the last value.
//!
//! ## Examples
//!
//! ```rust
//! use nosj::{Map, Value};
//!
//! let mut map = Map::new();
//! map.push("name".to_string(), Value::from("Alice"));
//! map.push("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```
//!
//! [`Value::Object`]: crate::Value::Object

use crate::Value;
use indexmap::IndexMap;

/// An ordered list of key-value entries that may repeat keys.
///
/// # Examples
///
/// ```rust
/// use nosj::{Map, Value};
///
/// let mut map = Map::new();
/// map.push("first".to_string(), Value::from(1));
/// map.push("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map(Vec<(String, Value)>);

impl Map {
    /// Creates an empty `Map`.
    #[must_use]
    pub fn new() -> Self {
        Map(Vec::new())
    }

    /// Creates an empty `Map` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(Vec::with_capacity(capacity))
    }

    /// Appends an entry, keeping any earlier entry with the same key.
    pub fn push(&mut self, key: String, value: Value) {
        self.0.push((key, value));
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key is already present, the value of its last occurrence is
    /// replaced in place and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        match self.0.iter_mut().rev().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    /// Returns the value of the last entry with this key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns every value stored under this key, in source order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Returns the number of entries, counting repeated keys separately.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if some key appears more than once.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        let mut seen = indexmap::IndexSet::with_capacity(self.0.len());
        !self.0.iter().all(|(k, _)| seen.insert(k.as_str()))
    }

    /// Folds repeated keys into one entry at the key's first position,
    /// holding the key's last value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::{Map, Value};
    ///
    /// let map: Map = vec![
    ///     ("a".to_string(), Value::from(1)),
    ///     ("b".to_string(), Value::from(2)),
    ///     ("a".to_string(), Value::from(3)),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let collapsed = map.collapse_duplicates();
    /// let entries: Vec<_> = collapsed.iter().map(|(k, v)| (k.as_str(), v.as_i64())).collect();
    /// assert_eq!(entries, vec![("a", Some(3)), ("b", Some(2))]);
    /// ```
    #[must_use]
    pub fn collapse_duplicates(self) -> Self {
        self.into_index_map().into()
    }

    /// Converts into an [`IndexMap`], with later duplicates overwriting earlier ones.
    #[must_use]
    pub fn into_index_map(self) -> IndexMap<String, Value> {
        self.0.into_iter().collect()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    /// Removes every entry, yielding the values in insertion order.
    pub(crate) fn drain_values(&mut self) -> impl Iterator<Item = Value> + '_ {
        self.0.drain(..).map(|(_, v)| v)
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.0.iter()
    }
}

impl From<IndexMap<String, Value>> for Map {
    fn from(map: IndexMap<String, Value>) -> Self {
        Map(map.into_iter().collect())
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map(Vec::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Map {
        vec![
            ("b".to_string(), Value::from(1)),
            ("a".to_string(), Value::from(2)),
            ("b".to_string(), Value::from(3)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let map = sample();
        assert_eq!(map.len(), 3);
        assert!(map.has_duplicates());
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "b"]);
        assert_eq!(
            map.values().filter_map(Value::as_i64).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            map.get_all("b").filter_map(Value::as_i64).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_get_returns_last_occurrence() {
        let map = sample();
        assert_eq!(map.get("b").and_then(Value::as_i64), Some(3));
        assert_eq!(map.get("a").and_then(Value::as_i64), Some(2));
        assert!(map.get("c").is_none());
        assert!(map.contains_key("a"));
    }

    #[test]
    fn test_collapse_keeps_first_position_last_value() {
        let collapsed = sample().collapse_duplicates();
        assert!(!collapsed.has_duplicates());
        let entries: Vec<_> = collapsed
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_i64()))
            .collect();
        assert_eq!(entries, vec![("b", Some(3)), ("a", Some(2))]);
    }

    #[test]
    fn test_insert_replaces_last_occurrence() {
        let mut map = sample();
        let old = map.insert("b".to_string(), Value::from(9));
        assert_eq!(old.and_then(|v| v.as_i64()), Some(3));
        assert_eq!(
            map.get_all("b").filter_map(Value::as_i64).collect::<Vec<_>>(),
            vec![1, 9]
        );
    }

    #[test]
    fn test_drain_values_empties_map() {
        let mut map = sample();
        let drained: Vec<_> = map.drain_values().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());
    }
}
