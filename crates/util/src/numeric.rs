//! Canonical arbitrary-precision form of JSON numbers.
//!
//! Every number is reduced to `sign * digits * 10^exponent` with no leading or
//! trailing zeros in `digits`, so two numbers denote the same value exactly
//! when their normalized forms are equal. Integers keep every digit. Floating
//! values are taken from their shortest round-trip decimal rendering, which
//! makes `1.0` and `1` the same value.

use std::fmt;

use serde_json::Number;

/// Largest exponent rendered without scientific notation.
const PLAIN_EXPONENT_LIMIT: i64 = 32;

/// Largest exponent magnitude accepted by [`NormalizedNumber::parse`].
pub const MAX_EXPONENT: i64 = i32::MAX as i64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedNumber {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl NormalizedNumber {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Parses decimal text: optional sign, digits with an optional fraction,
    /// optional exponent. Returns `None` for anything else, including
    /// exponents beyond [`MAX_EXPONENT`] in magnitude.
    ///
    /// # Example
    ///
    /// ```
    /// use typed_patch_util::NormalizedNumber;
    ///
    /// let a = NormalizedNumber::parse("12.50").unwrap();
    /// let b = NormalizedNumber::parse("1.25e1").unwrap();
    /// assert_eq!(a, b);
    /// assert!(NormalizedNumber::parse("1.2.3").is_none());
    /// assert!(NormalizedNumber::parse("1e-9223372036854775808").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, rest) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(at) => (&rest[..at], rest[at + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }

        let joined = format!("{int_part}{frac_part}");
        let significant = joined.trim_start_matches('0');
        let digits = significant.trim_end_matches('0');
        if digits.is_empty() {
            return Some(Self::zero());
        }
        let trailing = (significant.len() - digits.len()) as i64;
        let exponent = exponent
            .checked_sub(frac_part.len() as i64)?
            .checked_add(trailing)?;
        if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
            return None;
        }
        Some(Self {
            negative,
            digits: digits.to_string(),
            exponent,
        })
    }

    /// Normalizes a JSON number. Integers are taken digit for digit, floats
    /// through their shortest round-trip rendering.
    pub fn from_number(number: &Number) -> Self {
        let text = if let Some(n) = number.as_i64() {
            n.to_string()
        } else if let Some(n) = number.as_u64() {
            n.to_string()
        } else {
            match number.as_f64() {
                Some(f) => format!("{f:e}"),
                None => return Self::zero(),
            }
        };
        // Rendered integers and finite floats always parse.
        Self::parse(&text).unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whether the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.is_zero() || self.exponent >= 0
    }

    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() || self.exponent > 19 {
            return None;
        }
        self.to_string().parse().ok()
    }

    pub fn to_u64(&self) -> Option<u64> {
        if !self.is_integer() || self.exponent > 20 {
            return None;
        }
        self.to_string().parse().ok()
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.to_string().parse().ok().filter(|f: &f64| f.is_finite())
    }

    /// Converts back to a JSON number, preferring an integer representation.
    pub fn to_number(&self) -> Option<Number> {
        if let Some(n) = self.to_i64() {
            return Some(Number::from(n));
        }
        if let Some(n) = self.to_u64() {
            return Some(Number::from(n));
        }
        self.to_f64().and_then(Number::from_f64)
    }
}

impl From<&Number> for NormalizedNumber {
    fn from(number: &Number) -> Self {
        Self::from_number(number)
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        let len = self.digits.len() as u64;
        if (0..=PLAIN_EXPONENT_LIMIT).contains(&self.exponent) {
            f.write_str(&self.digits)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }
        let shift = self.exponent.unsigned_abs();
        if self.exponent < 0 && shift <= len + PLAIN_EXPONENT_LIMIT as u64 {
            if shift < len {
                let (int_part, frac_part) = self.digits.split_at((len - shift) as usize);
                return write!(f, "{int_part}.{frac_part}");
            }
            f.write_str("0.")?;
            for _ in 0..shift - len {
                f.write_str("0")?;
            }
            return f.write_str(&self.digits);
        }
        write!(f, "{}e{}", self.digits, self.exponent)
    }
}
