use core::fmt;
use std::str::FromStr;

use fraction::BigFraction;
use num_bigint::{BigInt, BigUint};
use num_traits::{pow, One};

use crate::error::ValueError;

/// A JSON number that preserves its exact source literal.
///
/// The literal is validated against the RFC 8259 number grammar at
/// construction and never re-interpreted, so integers of arbitrary size
/// and decimal literals round-trip without loss. Two numbers are equal
/// iff their literals are equal: `1`, `1.0`, and `1e0` are pairwise
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    literal: Box<str>,
}

impl Number {
    /// Parse an RFC 8259 number literal.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidLiteral`] if `literal` does not match
    /// the `number` production (`-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`).
    pub fn parse(literal: &str) -> Result<Number, ValueError> {
        if is_valid_literal(literal) {
            Ok(Number {
                literal: literal.into(),
            })
        } else {
            Err(ValueError::InvalidLiteral(literal.to_string()))
        }
    }

    /// Create a number from a finite `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NonFinite`] for NaN and ±infinity, which have
    /// no JSON representation.
    pub fn from_f64(value: f64) -> Result<Number, ValueError> {
        if value.is_finite() {
            Ok(Number {
                literal: format!("{value}").into(),
            })
        } else {
            Err(ValueError::NonFinite(value))
        }
    }

    /// The literal came out of an already validated JSON document.
    pub(crate) fn from_literal_unchecked(literal: &str) -> Number {
        debug_assert!(is_valid_literal(literal), "invalid literal: {literal}");
        Number {
            literal: literal.into(),
        }
    }

    /// The exact source literal.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// `true` iff the literal has neither a fraction part nor an exponent.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        !self.literal.contains(['.', 'e', 'E'])
    }

    /// The literal as `i64`, if integral and in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integral() {
            self.literal.parse().ok()
        } else {
            None
        }
    }

    /// The literal as `u64`, if integral, non-negative, and in range.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        if self.is_integral() {
            self.literal.parse().ok()
        } else {
            None
        }
    }

    /// The literal as `f64`. Lossy: precision beyond an IEEE 754 double is
    /// discarded and out-of-range magnitudes saturate to infinity.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.literal.parse().unwrap_or(f64::NAN)
    }

    /// The literal as an arbitrary-precision integer, if integral.
    #[must_use]
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.is_integral() {
            BigInt::from_str(&self.literal).ok()
        } else {
            None
        }
    }

    /// The exact value of the literal as a rational number.
    ///
    /// `0.1` becomes exactly 1/10, not the nearest double.
    #[must_use]
    pub fn to_fraction(&self) -> BigFraction {
        let parts = Parts::of(&self.literal);
        let mut digits = String::with_capacity(parts.integer.len() + parts.fraction.len());
        digits.push_str(parts.integer);
        digits.push_str(parts.fraction);
        let mantissa = BigUint::from_str(&digits).expect("digits only");
        // value = mantissa * 10^(exponent - fraction digits)
        let shift = i128::from(parts.exponent) - parts.fraction.len() as i128;
        let scale = pow(
            BigUint::from(10u32),
            usize::try_from(shift.unsigned_abs()).expect("exponent exceeds addressable range"),
        );
        let (numerator, denominator) = if shift >= 0 {
            (mantissa * scale, BigUint::one())
        } else {
            (mantissa, scale)
        };
        let fraction = BigFraction::new(numerator, denominator);
        if parts.negative {
            -fraction
        } else {
            fraction
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Number {
                    let mut buffer = itoa::Buffer::new();
                    Number {
                        literal: buffer.format(value).into(),
                    }
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Number {
        Number {
            literal: value.to_string().into(),
        }
    }
}

/// The literal split into its grammar components.
struct Parts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
    exponent: i64,
}

impl<'a> Parts<'a> {
    fn of(literal: &'a str) -> Parts<'a> {
        let (negative, rest) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        let (mantissa, exponent) = match rest.split_once(['e', 'E']) {
            Some((mantissa, exp)) => {
                let exp = exp.strip_prefix('+').unwrap_or(exp);
                // Exponents beyond i64 denote magnitudes no in-memory
                // representation can hold; saturate instead of panicking.
                let exponent = exp.parse().unwrap_or(if exp.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                });
                (mantissa, exponent)
            }
            None => (rest, 0),
        };
        let (integer, fraction) = match mantissa.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (mantissa, ""),
        };
        Parts {
            negative,
            integer,
            fraction,
            exponent,
        }
    }
}

/// RFC 8259 `number` grammar.
fn is_valid_literal(literal: &str) -> bool {
    let mut bytes = literal.as_bytes();
    if let [b'-', rest @ ..] = bytes {
        bytes = rest;
    }
    // int: "0" or 1-9 followed by digits
    bytes = match bytes {
        [b'0', rest @ ..] => rest,
        [b'1'..=b'9', rest @ ..] => {
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            &rest[digits..]
        }
        _ => return false,
    };
    // frac: "." followed by one or more digits
    if let [b'.', rest @ ..] = bytes {
        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        bytes = &rest[digits..];
    }
    // exp: "e"/"E", optional sign, one or more digits
    if let [b'e' | b'E', rest @ ..] = bytes {
        let rest = match rest {
            [b'+' | b'-', rest @ ..] => rest,
            _ => rest,
        };
        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        bytes = &rest[digits..];
    }
    bytes.is_empty()
}
