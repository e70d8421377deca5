//! Configuration options for nosj parsing.
//!
//! This module provides types to customize how documents are accepted:
//!
//! - [`ParseOptions`]: Main configuration struct
//! - [`DuplicateKeys`]: What to do when an object repeats a key
//!
//! ## Examples
//!
//! ```rust
//! use nosj::{parse_with_options, DuplicateKeys, ParseOptions};
//!
//! // Keep the last value of a repeated key
//! let options = ParseOptions::new().with_duplicate_keys(DuplicateKeys::LastWins);
//! let value = parse_with_options(br#"{"a":1,"b":2,"a":3}"#, &options).unwrap();
//! assert_eq!(value.to_string(), r#"{"a":3,"b":2}"#);
//!
//! // Shallow documents only
//! let options = ParseOptions::new().with_max_depth(2);
//! assert!(parse_with_options(b"[[[1]]]", &options).is_err());
//! ```

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Policy for objects that contain the same key more than once.
///
/// - **Preserve**: Default, keep every entry in source order
/// - **LastWins**: Keep one entry per key at its first position, with the last value
/// - **Reject**: Fail the parse at the second occurrence
///
/// # Examples
///
/// ```rust
/// use nosj::DuplicateKeys;
///
/// assert_eq!(DuplicateKeys::default(), DuplicateKeys::Preserve);
/// assert_eq!(DuplicateKeys::LastWins.as_str(), "last-wins");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    #[default]
    Preserve,
    LastWins,
    Reject,
}

impl DuplicateKeys {
    /// Returns the name used for this policy on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DuplicateKeys::Preserve => "preserve",
            DuplicateKeys::LastWins => "last-wins",
            DuplicateKeys::Reject => "reject",
        }
    }
}

/// Configuration options for parsing.
///
/// # Examples
///
/// ```rust
/// use nosj::{DuplicateKeys, ParseOptions};
///
/// // Defaults: depth 1024, no size limit, duplicates preserved
/// let options = ParseOptions::new();
///
/// // Custom configuration
/// let options = ParseOptions::new()
///     .with_max_depth(64)
///     .with_max_input_size(1 << 20)
///     .with_duplicate_keys(DuplicateKeys::Reject);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub max_input_size: Option<usize>,
    pub duplicate_keys: DuplicateKeys,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_size: None,
            duplicate_keys: DuplicateKeys::default(),
        }
    }
}

impl ParseOptions {
    /// Creates default options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::ParseOptions;
    ///
    /// let options = ParseOptions::new();
    /// assert_eq!(options.max_depth, 1024);
    /// assert!(options.max_input_size.is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject duplicate keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::{DuplicateKeys, ParseOptions};
    ///
    /// assert_eq!(ParseOptions::strict().duplicate_keys, DuplicateKeys::Reject);
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        ParseOptions {
            duplicate_keys: DuplicateKeys::Reject,
            ..Default::default()
        }
    }

    /// Sets the maximum nesting depth.
    ///
    /// The top-level array or object is depth 1. A document nested deeper
    /// fails with a resource error.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum input size in bytes.
    #[must_use]
    pub fn with_max_input_size(mut self, limit: usize) -> Self {
        self.max_input_size = Some(limit);
        self
    }

    #[must_use]
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }
}
