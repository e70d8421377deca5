//! Lossless number representation.
//!
//! A [`Number`] keeps the canonical text of the source number alongside its
//! decoded `f64`, so no precision is lost between parsing and serialization.
//!
//! ## Canonical form
//!
//! The sign, integer digits and fraction digits are kept verbatim. Only the
//! exponent is normalized:
//!
//! - the marker is always a lowercase `e`
//! - an explicit `+` sign is dropped
//! - leading zeros in the exponent digits are stripped
//! - an all-zero exponent is written as `e0`
//!
//! ```rust
//! use nosj::Number;
//!
//! let n: Number = "-2.50E+003".parse().unwrap();
//! assert_eq!(n.as_str(), "-2.50e3");
//! assert_eq!(n.as_f64(), -2500.0);
//! ```

use crate::{Error, Position, Result};
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Largest decimal exponent [`Number::to_bigint`] will expand.
pub const MAX_BIGINT_EXPONENT: u64 = 4096;

/// A decimal number as it appeared in the source, in canonical form.
///
/// Equality and hashing use the canonical text, so `1.0` and `1` are distinct
/// numbers even though they decode to the same `f64`.
#[derive(Clone, Debug)]
pub struct Number {
    text: String,
    value: f64,
}

/// Scans one number token starting at `start`.
///
/// Returns the end offset of the token, or the offset and description of the
/// first character that breaks the number grammar.
pub(crate) fn scan(input: &[u8], start: usize) -> std::result::Result<usize, (usize, &'static str)> {
    let mut pos = start;
    let digit_at = |pos: usize| input.get(pos).is_some_and(u8::is_ascii_digit);

    if input.get(pos) == Some(&b'-') {
        pos += 1;
    }

    match input.get(pos) {
        Some(b'0') => {
            pos += 1;
            if digit_at(pos) {
                return Err((pos - 1, "leading zeros are not allowed in numbers"));
            }
        }
        Some(b'1'..=b'9') => {
            while digit_at(pos) {
                pos += 1;
            }
        }
        _ => return Err((pos, "expected digit after '-'")),
    }

    if input.get(pos) == Some(&b'.') {
        pos += 1;
        if !digit_at(pos) {
            return Err((pos, "expected digit after decimal point"));
        }
        while digit_at(pos) {
            pos += 1;
        }
    }

    if let Some(b'e' | b'E') = input.get(pos) {
        pos += 1;
        if let Some(b'+' | b'-') = input.get(pos) {
            pos += 1;
        }
        if !digit_at(pos) {
            return Err((pos, "expected digit in exponent"));
        }
        while digit_at(pos) {
            pos += 1;
        }
    }

    Ok(pos)
}

/// Rewrites a grammar-valid lexeme into canonical form.
fn canonicalize(lexeme: &str) -> String {
    let Some(idx) = lexeme.find(['e', 'E']) else {
        return lexeme.to_string();
    };
    let (mantissa, exponent) = (&lexeme[..idx], &lexeme[idx + 1..]);
    let (negative, digits) = match exponent.as_bytes().first() {
        Some(b'-') => (true, &exponent[1..]),
        Some(b'+') => (false, &exponent[1..]),
        _ => (false, exponent),
    };
    let digits = digits.trim_start_matches('0');

    let mut out = String::with_capacity(lexeme.len());
    out.push_str(mantissa);
    out.push('e');
    if digits.is_empty() {
        out.push('0');
    } else {
        if negative {
            out.push('-');
        }
        out.push_str(digits);
    }
    out
}

impl Number {
    /// Builds a number from a lexeme the lexer has already validated.
    pub(crate) fn from_lexeme(lexeme: &str) -> Self {
        let text = canonicalize(lexeme);
        // Any grammar-valid lexeme is accepted by the float parser; overflow
        // saturates to infinity.
        let value = text.parse::<f64>().unwrap_or(f64::NAN);
        Number { text, value }
    }

    /// Converts a finite `f64`. Returns `None` for NaN and infinities.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::Number;
    ///
    /// assert_eq!(Number::from_f64(1.5).map(|n| n.to_string()), Some("1.5".into()));
    /// assert!(Number::from_f64(f64::NAN).is_none());
    /// ```
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() {
            Some(Number::from_lexeme(&value.to_string()))
        } else {
            None
        }
    }

    /// The canonical text of this number.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if the number was written without fraction or exponent.
    #[inline]
    #[must_use]
    pub fn is_integer(&self) -> bool {
        !self.text.contains(['.', 'e'])
    }

    /// The decoded value. Magnitudes beyond `f64` range become infinite.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// Converts this number to an `i64` if its exact value is an integer in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nosj::Number;
    ///
    /// let n: Number = "12".parse().unwrap();
    /// assert_eq!(n.as_i64(), Some(12));
    /// let n: Number = "1.20e1".parse().unwrap();
    /// assert_eq!(n.as_i64(), Some(12));
    /// let n: Number = "1.5".parse().unwrap();
    /// assert_eq!(n.as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integer() {
            return self.text.parse().ok();
        }
        self.to_bigint().and_then(|n| i64::try_from(n).ok())
    }

    /// Converts this number to a `u64` if its exact value is a non-negative
    /// integer in range.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        if self.is_integer() {
            return self.text.parse().ok().or_else(|| {
                // "-0" is integral and non-negative
                (self.text == "-0").then_some(0)
            });
        }
        self.to_bigint().and_then(|n| u64::try_from(n).ok())
    }

    /// Returns the exact value as a [`BigInt`] when it is integral.
    ///
    /// Exponents larger than [`MAX_BIGINT_EXPONENT`] are not expanded and
    /// yield `None`.
    #[must_use]
    pub fn to_bigint(&self) -> Option<BigInt> {
        let (mantissa, exponent) = match self.text.split_once('e') {
            Some((m, e)) => (m, e),
            None => (self.text.as_str(), "0"),
        };
        let (negative, mantissa) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        let mut digits = String::with_capacity(int_part.len() + frac_part.len() + 1);
        if negative {
            digits.push('-');
        }
        digits.push_str(int_part);
        digits.push_str(frac_part);

        if int_part.bytes().chain(frac_part.bytes()).all(|b| b == b'0') {
            return Some(BigInt::default());
        }

        let (exp_negative, exp_digits) = match exponent.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, exponent),
        };
        let magnitude: u64 = exp_digits.parse().ok().filter(|&m| m <= MAX_BIGINT_EXPONENT)?;
        let frac_len = frac_part.len() as i64;
        let scale = if exp_negative {
            -(magnitude as i64) - frac_len
        } else {
            magnitude as i64 - frac_len
        };

        if scale >= 0 {
            digits.extend(std::iter::repeat('0').take(scale as usize));
        } else {
            let drop = scale.unsigned_abs() as usize;
            let keep = digits.len().checked_sub(drop)?;
            if !digits[keep..].bytes().all(|b| b == b'0') {
                return None;
            }
            digits.truncate(keep);
            if digits.is_empty() || digits == "-" {
                return Some(BigInt::default());
            }
        }

        digits.parse().ok()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Number {
    type Err = Error;

    /// Parses a single number token, rejecting anything the grammar does not allow.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let end = scan(bytes, 0).map_err(|(at, msg)| Error::lexical(Position::locate(bytes, at), msg))?;
        if end != bytes.len() {
            return Err(Error::lexical(
                Position::locate(bytes, end),
                "unexpected character after number",
            ));
        }
        Ok(Number::from_lexeme(s))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number {
                        text: value.to_string(),
                        value: value as f64,
                    }
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(i) = self.as_i64() {
            serializer.serialize_i64(i)
        } else if let Some(u) = self.as_u64() {
            serializer.serialize_u64(u)
        } else {
            serializer.serialize_f64(self.value)
        }
    }
}
