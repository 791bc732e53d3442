//! Fixed-point decimal with exact string round-trips.
//!
//! Every price and size that crosses the signing boundary is a [`Decimal`]:
//! a signed 128-bit significand paired with a non-negative scale (at most
//! [`MAX_SCALE`]). Parsing never reduces the scale, so `"10.00"` and `"10.0"`
//! remain textually distinct until [`Decimal::normalize`] is called — the
//! step the signing core always takes immediately before hashing, so that
//! `10.0` and `10.00` produce identical signatures.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Largest scale a [`Decimal`] may carry.
pub const MAX_SCALE: u8 = 28;

/// Upper bound on the text length of any valid `Decimal`: a sign byte, up
/// to 39 integer digits (`i128::MAX` has 39 digits), a dot, and up to
/// [`MAX_SCALE`] fractional digits.
const MAX_TEXT_LEN: usize = 1 + 39 + 1 + MAX_SCALE as usize;

/// A fixed-point decimal number: `significand * 10^-scale`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decimal {
    significand: i128,
    scale: u8,
}

/// A stack-allocated formatted `Decimal`, returned by [`Decimal::format`].
///
/// Borrows no heap storage; `as_str` is valid for the lifetime of this value.
#[derive(Clone, Copy)]
pub struct DecimalText {
    buf: [u8; MAX_TEXT_LEN],
    len: usize,
}

impl DecimalText {
    /// The formatted text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Safety/invariant: every byte written by `Decimal::format` is ASCII.
        core::str::from_utf8(&self.buf[..self.len]).expect("decimal text is always ASCII")
    }
}

impl fmt::Display for DecimalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DecimalText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Decimal {
    /// `0`, at scale 0.
    pub const ZERO: Decimal = Decimal {
        significand: 0,
        scale: 0,
    };

    /// Builds a `Decimal` directly from a significand and scale.
    ///
    /// `scale` must be at most [`MAX_SCALE`]; this is a constructor for
    /// values already known to be in range (e.g. literals), not a parser.
    pub fn from_parts(significand: i128, scale: u8) -> Result<Decimal, Error> {
        if scale > MAX_SCALE {
            return Err(Error::InvalidInput(format!(
                "scale {scale} exceeds maximum of {MAX_SCALE}"
            )));
        }
        Ok(Decimal { significand, scale })
    }

    /// Parses a decimal from text.
    ///
    /// Grammar: an optional leading `+`/`-`, at least one digit, at most one
    /// `.`, and zero or more fractional digits. The scale is the number of
    /// digits after the `.` — trailing zeros are preserved, not reduced.
    pub fn parse(text: &str) -> Result<Decimal, Error> {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Err(Error::InvalidInput("empty decimal string".into()));
        }

        let mut i = 0;
        let negative = match bytes[0] {
            b'-' => {
                i = 1;
                true
            }
            b'+' => {
                i = 1;
                false
            }
            _ => false,
        };

        let mut significand: i128 = 0;
        let mut digits_seen = 0usize;
        let mut scale: u32 = 0;
        let mut seen_dot = false;

        while i < bytes.len() {
            match bytes[i] {
                b'0'..=b'9' => {
                    let digit = (bytes[i] - b'0') as i128;
                    significand = significand
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or_else(|| {
                            Error::InvalidInput(format!("decimal '{text}' overflows 128 bits"))
                        })?;
                    digits_seen += 1;
                    if seen_dot {
                        scale += 1;
                    }
                }
                b'.' => {
                    if seen_dot {
                        return Err(Error::InvalidInput(format!(
                            "decimal '{text}' has more than one '.'"
                        )));
                    }
                    seen_dot = true;
                }
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "decimal '{text}' contains an invalid character"
                    )));
                }
            }
            i += 1;
        }

        if digits_seen == 0 {
            return Err(Error::InvalidInput(format!(
                "decimal '{text}' has no digits"
            )));
        }
        if scale > MAX_SCALE as u32 {
            return Err(Error::InvalidInput(format!(
                "decimal '{text}' scale {scale} exceeds maximum of {MAX_SCALE}"
            )));
        }

        if negative {
            significand = -significand;
        }

        Ok(Decimal {
            significand,
            scale: scale as u8,
        })
    }

    /// This value's significand.
    #[must_use]
    pub fn significand(&self) -> i128 {
        self.significand
    }

    /// This value's scale.
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.significand == 0
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.significand < 0
    }

    /// Formats this value into a fixed stack buffer — no heap allocation.
    #[must_use]
    pub fn format(&self) -> DecimalText {
        let mut buf = [0u8; MAX_TEXT_LEN];
        let mut len = 0usize;

        let negative = self.significand < 0;
        // i128::MIN negated overflows i128; widen through unsigned.
        let magnitude = self.significand.unsigned_abs();

        if negative {
            buf[len] = b'-';
            len += 1;
        }

        let scale = self.scale as usize;
        let divisor = pow10(scale as u32);
        let int_part = magnitude / divisor;
        let frac_part = magnitude % divisor;

        len += write_u128(&mut buf[len..], int_part);

        if scale > 0 {
            buf[len] = b'.';
            len += 1;
            // Zero-padded fractional digits, `scale` digits wide.
            let mut digits = [0u8; MAX_SCALE as usize];
            let mut rem = frac_part;
            for slot in digits[..scale].iter_mut().rev() {
                *slot = b'0' + (rem % 10) as u8;
                rem /= 10;
            }
            buf[len..len + scale].copy_from_slice(&digits[..scale]);
            len += scale;
        }

        DecimalText { buf, len }
    }

    /// Strips trailing zero fractional digits, producing the canonical form
    /// hashed by the signing core. Zero always normalizes to scale 0.
    #[must_use]
    pub fn normalize(&self) -> Decimal {
        if self.significand == 0 {
            return Decimal::ZERO;
        }
        let mut significand = self.significand;
        let mut scale = self.scale;
        while scale > 0 && significand % 10 == 0 {
            significand /= 10;
            scale -= 1;
        }
        Decimal { significand, scale }
    }

    /// Rescales to the target scale by multiplying the significand by the
    /// matching power of ten. The target scale must be ≥ the current scale.
    fn rescale_up_to(&self, target_scale: u8) -> i128 {
        debug_assert!(target_scale >= self.scale);
        self.significand * pow10((target_scale - self.scale) as u32) as i128
    }

    #[must_use]
    pub fn add(&self, other: &Decimal) -> Decimal {
        let scale = self.scale.max(other.scale);
        let significand = self.rescale_up_to(scale) + other.rescale_up_to(scale);
        Decimal { significand, scale }
    }

    #[must_use]
    pub fn sub(&self, other: &Decimal) -> Decimal {
        let scale = self.scale.max(other.scale);
        let significand = self.rescale_up_to(scale) - other.rescale_up_to(scale);
        Decimal { significand, scale }
    }

    #[must_use]
    pub fn mul(&self, other: &Decimal) -> Decimal {
        let scale = self.scale as u32 + other.scale as u32;
        debug_assert!(scale <= u8::MAX as u32);
        Decimal {
            significand: self.significand * other.significand,
            scale: scale as u8,
        }
    }

    /// Divides `self` by `other`, producing a result with the given scale.
    /// The numerator is rescaled up to `result_scale + other.scale` before
    /// the integer division, which truncates towards zero.
    #[must_use]
    pub fn div(&self, other: &Decimal, result_scale: u8) -> Decimal {
        let target_scale = result_scale as u32 + other.scale as u32;
        let numerator = if target_scale >= self.scale as u32 {
            self.significand * pow10(target_scale - self.scale as u32) as i128
        } else {
            self.significand / pow10(self.scale as u32 - target_scale) as i128
        };
        let significand = numerator / other.significand;
        Decimal {
            significand,
            scale: result_scale,
        }
    }

    /// Rounds to `dp` decimal places, half away from zero.
    #[must_use]
    pub fn round_dp(&self, dp: u8) -> Decimal {
        if dp >= self.scale {
            return *self;
        }
        let drop = (self.scale - dp) as u32;
        let divisor = pow10(drop) as i128;
        let magnitude = self.significand.unsigned_abs() as i128;
        let truncated = magnitude / divisor;
        let remainder = magnitude % divisor;
        let rounded = if remainder * 2 >= divisor {
            truncated + 1
        } else {
            truncated
        };
        let signed = if self.significand < 0 {
            -rounded
        } else {
            rounded
        };
        Decimal {
            significand: signed,
            scale: dp,
        }
    }

    /// Rounds to `dp` decimal places in a fixed direction rather than half
    /// away from zero: `round_up` rounds any nonzero remainder towards
    /// positive infinity, otherwise towards negative infinity.
    #[must_use]
    pub fn round_dp_directed(&self, dp: u8, round_up: bool) -> Decimal {
        if dp >= self.scale {
            return *self;
        }
        let drop = (self.scale - dp) as u32;
        let divisor = pow10(drop) as i128;
        let magnitude = self.significand.unsigned_abs() as i128;
        let truncated = magnitude / divisor;
        let remainder = magnitude % divisor;
        // Rounding towards +inf on a positive value, or towards -inf on a
        // negative one, both increase the magnitude; the other combination
        // leaves it truncated.
        let away_from_zero = round_up == (self.significand >= 0);
        let rounded = if remainder != 0 && away_from_zero {
            truncated + 1
        } else {
            truncated
        };
        let signed = if self.significand < 0 { -rounded } else { rounded };
        Decimal {
            significand: signed,
            scale: dp,
        }
    }

    #[must_use]
    pub fn abs(&self) -> Decimal {
        Decimal {
            significand: self.significand.abs(),
            scale: self.scale,
        }
    }

    #[must_use]
    pub fn neg(&self) -> Decimal {
        Decimal {
            significand: -self.significand,
            scale: self.scale,
        }
    }

    /// `floor(log10(|self|))`, or `None` for zero.
    #[must_use]
    pub fn floor_log10(&self) -> Option<i32> {
        if self.significand == 0 {
            return None;
        }
        let magnitude = self.significand.unsigned_abs();
        let int_digits = decimal_digit_count(magnitude) as i32;
        // `magnitude` has `int_digits` digits before scaling by 10^-scale,
        // so log10(|self|) = (int_digits - 1) - scale, exactly, because
        // `magnitude` has no leading zero digit by construction.
        Some(int_digits - 1 - self.scale as i32)
    }
}

fn decimal_digit_count(mut v: u128) -> u32 {
    if v == 0 {
        return 1;
    }
    let mut count = 0;
    while v > 0 {
        count += 1;
        v /= 10;
    }
    count
}

fn pow10(n: u32) -> u128 {
    10u128.pow(n)
}

fn write_u128(out: &mut [u8], mut v: u128) -> usize {
    if v == 0 {
        out[0] = b'0';
        return 1;
    }
    let mut digits = [0u8; 39];
    let mut n = 0;
    while v > 0 {
        digits[n] = b'0' + (v % 10) as u8;
        v /= 10;
        n += 1;
    }
    for (slot, digit) in out[..n].iter_mut().zip(digits[..n].iter().rev()) {
        *slot = *digit;
    }
    n
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescale_up_to(scale).cmp(&other.rescale_up_to(scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format().as_str())
    }
}

impl FromStr for Decimal {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.format().as_str())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Decimal::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_trailing_zeros() {
        for text in ["10.0", "10.00", "0.00100", "-3.140", "0"] {
            let d = Decimal::parse(text).unwrap();
            assert_eq!(d.format().as_str(), text, "round-trip for {text}");
        }
    }

    #[test]
    fn normalize_strips_only_zero_fraction_digits() {
        assert_eq!(Decimal::parse("10.00").unwrap().normalize().format().as_str(), "10");
        assert_eq!(Decimal::parse("10.10").unwrap().normalize().format().as_str(), "10.1");
        assert_eq!(Decimal::parse("0.00").unwrap().normalize().format().as_str(), "0");
        assert_eq!(Decimal::parse("-5.500").unwrap().normalize().format().as_str(), "-5.5");
    }

    #[test]
    fn normalize_is_idempotent_and_reparses() {
        let d = Decimal::parse("123.4500").unwrap();
        let n = d.normalize();
        assert_eq!(Decimal::parse(n.format().as_str()).unwrap(), n);
        assert_eq!(n.normalize(), n);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Decimal::parse("").is_err());
        assert!(Decimal::parse("1.2.3").is_err());
        assert!(Decimal::parse("abc").is_err());
        assert!(Decimal::parse(".").is_err());
    }

    #[test]
    fn rejects_oversized_scale() {
        let text = format!("1.{}", "0".repeat(29));
        assert!(Decimal::parse(&text).is_err());
    }

    #[test]
    fn addition_is_associative() {
        let a = Decimal::parse("1.1").unwrap();
        let b = Decimal::parse("2.22").unwrap();
        let c = Decimal::parse("3.333").unwrap();
        assert_eq!(a.add(&b).add(&c), a.add(&b.add(&c)));
    }

    #[test]
    fn multiply_adds_scales() {
        let a = Decimal::parse("1.5").unwrap();
        let b = Decimal::parse("2.25").unwrap();
        let product = a.mul(&b);
        assert_eq!(product.scale(), 3);
        assert_eq!(product.format().as_str(), "3.375");
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(Decimal::parse("1.25").unwrap().round_dp(1).format().as_str(), "1.3");
        assert_eq!(Decimal::parse("-1.25").unwrap().round_dp(1).format().as_str(), "-1.3");
        assert_eq!(Decimal::parse("1.24").unwrap().round_dp(1).format().as_str(), "1.2");
    }

    #[test]
    fn round_dp_directed_picks_a_fixed_direction() {
        let price = Decimal::parse("100.051").unwrap();
        assert_eq!(price.round_dp_directed(2, true).format().as_str(), "100.06");
        assert_eq!(price.round_dp_directed(2, false).format().as_str(), "100.05");
        let exact = Decimal::parse("100.05").unwrap();
        assert_eq!(exact.round_dp_directed(2, true).format().as_str(), "100.05");
        assert_eq!(exact.round_dp_directed(2, false).format().as_str(), "100.05");
    }

    #[test]
    fn round_dp_directed_handles_negative_values() {
        let price = Decimal::parse("-100.051").unwrap();
        assert_eq!(price.round_dp_directed(2, true).format().as_str(), "-100.05");
        assert_eq!(price.round_dp_directed(2, false).format().as_str(), "-100.06");
    }

    #[test]
    fn floor_log10_matches_significant_figures() {
        assert_eq!(Decimal::parse("50000").unwrap().floor_log10(), Some(4));
        assert_eq!(Decimal::parse("0.001").unwrap().floor_log10(), Some(-3));
        assert_eq!(Decimal::parse("9.9").unwrap().floor_log10(), Some(0));
        assert_eq!(Decimal::ZERO.floor_log10(), None);
    }
}
