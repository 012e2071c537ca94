//! Scaled 128-bit fixed-point decimal for money-safe arithmetic.
//!
//! All values are stored as an `i128` implicitly scaled by 10^9.
//! Multiplication and division rescale through the 10^9 factor with
//! truncating integer division: there is no implicit rounding anywhere
//! in the arithmetic path. Explicit half-up rounding is available only
//! through [`Decimal::round`].

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Errors produced by decimal construction and arithmetic.
///
/// These are ordinary recoverable results; callers typically skip the
/// offending tick or order rather than abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecimalError {
    /// Result would exceed the representable maximum.
    #[error("decimal overflow")]
    Overflow,
    /// Result would exceed the representable minimum.
    #[error("decimal underflow")]
    Underflow,
    /// Division by a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// Input string is not a valid decimal literal.
    #[error("invalid decimal format")]
    InvalidFormat,
    /// Input has more than nine fractional digits.
    #[error("too many decimal places")]
    TooManyDecimalPlaces,
}

/// Signed fixed-point decimal scaled by 10^9.
///
/// Immutable value type: every operation returns a new instance.
/// Allocation-free and panic-free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Decimal(i128);

impl Decimal {
    /// Scaling factor (nine fractional digits).
    pub const SCALE: i128 = 1_000_000_000;

    /// Number of fractional digits carried.
    pub const FRACTIONAL_DIGITS: u32 = 9;

    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One, in scaled representation.
    pub const ONE: Self = Self(Self::SCALE);

    /// Largest representable value.
    pub const MAX: Self = Self(i128::MAX);

    /// Smallest representable value.
    pub const MIN: Self = Self(i128::MIN);

    /// Create from a whole integer.
    #[inline(always)]
    pub const fn from_int(n: i64) -> Self {
        Self(n as i128 * Self::SCALE)
    }

    /// Create from the raw scaled representation.
    #[inline(always)]
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Raw scaled representation.
    #[inline(always)]
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Best-effort conversion from a binary float. May lose precision.
    pub fn try_from_f64(f: f64) -> Result<Self, DecimalError> {
        if !f.is_finite() {
            return Err(DecimalError::InvalidFormat);
        }
        let scaled = f * Self::SCALE as f64;
        if scaled >= i128::MAX as f64 {
            return Err(DecimalError::Overflow);
        }
        if scaled <= i128::MIN as f64 {
            return Err(DecimalError::Underflow);
        }
        Ok(Self(scaled.round() as i128))
    }

    /// Lossy projection to a binary float, for display and ratio math
    /// only. Never feed the result back into money arithmetic.
    #[inline(always)]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Check if the value is zero.
    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if the value is strictly positive.
    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Check if the value is strictly negative.
    #[inline(always)]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Negation.
    #[inline(always)]
    pub const fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// Minimum of two values.
    #[inline(always)]
    pub const fn min(self, other: Self) -> Self {
        if self.0 < other.0 { self } else { other }
    }

    /// Maximum of two values.
    #[inline(always)]
    pub const fn max(self, other: Self) -> Self {
        if self.0 > other.0 { self } else { other }
    }

    /// Checked addition. Bounds are tested before committing.
    #[inline]
    pub const fn checked_add(self, rhs: Self) -> Result<Self, DecimalError> {
        if rhs.0 > 0 && self.0 > i128::MAX - rhs.0 {
            return Err(DecimalError::Overflow);
        }
        if rhs.0 < 0 && self.0 < i128::MIN - rhs.0 {
            return Err(DecimalError::Underflow);
        }
        Ok(Self(self.0 + rhs.0))
    }

    /// Checked subtraction. Bounds are tested before committing.
    #[inline]
    pub const fn checked_sub(self, rhs: Self) -> Result<Self, DecimalError> {
        if rhs.0 < 0 && self.0 > i128::MAX + rhs.0 {
            return Err(DecimalError::Overflow);
        }
        if rhs.0 > 0 && self.0 < i128::MIN + rhs.0 {
            return Err(DecimalError::Underflow);
        }
        Ok(Self(self.0 - rhs.0))
    }

    /// Checked multiplication, rescaled by 10^9 with truncating division.
    ///
    /// Truncation is deliberate: no implicit rounding on multiply.
    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Result<Self, DecimalError> {
        match self.0.checked_mul(rhs.0) {
            Some(wide) => Ok(Self(wide / Self::SCALE)),
            None => {
                if (self.0 < 0) == (rhs.0 < 0) {
                    Err(DecimalError::Overflow)
                } else {
                    Err(DecimalError::Underflow)
                }
            }
        }
    }

    /// Checked division, rescaled by 10^9 with truncating division.
    ///
    /// Truncates toward zero: `100 / 3 == 33.333333333`.
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Result<Self, DecimalError> {
        if rhs.0 == 0 {
            return Err(DecimalError::DivisionByZero);
        }
        let wide = match self.0.checked_mul(Self::SCALE) {
            Some(w) => w,
            None => {
                return if (self.0 < 0) == (rhs.0 < 0) {
                    Err(DecimalError::Overflow)
                } else {
                    Err(DecimalError::Underflow)
                };
            }
        };
        match wide.checked_div(rhs.0) {
            Some(q) => Ok(Self(q)),
            None => Err(DecimalError::Overflow),
        }
    }

    /// Half-up rounding (away from zero on the magnitude) to `places`
    /// fractional digits.
    ///
    /// This is the only rounding operation on the type; the truncating
    /// multiply/divide policy above is separate and intentional.
    pub fn round(self, places: u32) -> Result<Self, DecimalError> {
        if places >= Self::FRACTIONAL_DIGITS {
            return Ok(self);
        }
        let factor = 10_i128.pow(Self::FRACTIONAL_DIGITS - places);
        let rem = self.0 % factor;
        let base = self.0 - rem;
        if rem.abs() * 2 >= factor {
            let bump = if self.0 < 0 { -factor } else { factor };
            match base.checked_add(bump) {
                Some(v) => Ok(Self(v)),
                None => Err(if self.0 < 0 {
                    DecimalError::Underflow
                } else {
                    DecimalError::Overflow
                }),
            }
        } else {
            Ok(Self(base))
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    /// Parse a `"<int>.<frac>"` literal with at most nine fractional
    /// digits. A bare integer is also accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if body.is_empty() {
            return Err(DecimalError::InvalidFormat);
        }

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecimalError::InvalidFormat);
        }
        if body.contains('.') {
            if frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DecimalError::InvalidFormat);
            }
            if frac_part.len() > Self::FRACTIONAL_DIGITS as usize {
                return Err(DecimalError::TooManyDecimalPlaces);
            }
        }

        let int: i128 = int_part.parse().map_err(|_| DecimalError::InvalidFormat)?;
        let mut frac: i128 = 0;
        if !frac_part.is_empty() {
            frac = frac_part.parse().map_err(|_| DecimalError::InvalidFormat)?;
            frac *= 10_i128.pow(Self::FRACTIONAL_DIGITS - frac_part.len() as u32);
        }

        let magnitude = int
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac))
            .ok_or(DecimalError::Overflow)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = (self.0 / Self::SCALE).abs();
        let frac = (self.0 % Self::SCALE).abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        if frac == 0 {
            write!(f, "{sign}{int}")
        } else {
            let digits = format!("{frac:09}");
            write!(f, "{sign}{int}.{}", digits.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_sub() {
        let a = Decimal::from_int(100);
        let b = Decimal::from_int(50);
        assert_eq!(a.checked_add(b).unwrap(), Decimal::from_int(150));
        assert_eq!(a.checked_sub(b).unwrap(), Decimal::from_int(50));
    }

    #[test]
    fn test_add_overflow() {
        assert_eq!(
            Decimal::MAX.checked_add(Decimal::ONE),
            Err(DecimalError::Overflow)
        );
        assert_eq!(
            Decimal::MIN.checked_sub(Decimal::ONE),
            Err(DecimalError::Underflow)
        );
    }

    #[test]
    fn test_div_truncates() {
        let q = Decimal::from_int(100)
            .checked_div(Decimal::from_int(3))
            .unwrap();
        assert_eq!(q, dec("33.333333333"));
        assert_eq!(q.to_string(), "33.333333333");
    }

    #[test]
    fn test_mul_truncates() {
        // 0.000000001 * 0.5 = 0.0000000005, truncated to zero
        let tiny = Decimal::from_raw(1);
        let half = dec("0.5");
        assert_eq!(tiny.checked_mul(half).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(
            Decimal::ONE.checked_div(Decimal::ZERO),
            Err(DecimalError::DivisionByZero)
        );
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(dec("1.25").round(1).unwrap(), dec("1.3"));
        assert_eq!(dec("1.24").round(1).unwrap(), dec("1.2"));
        assert_eq!(dec("-1.25").round(1).unwrap(), dec("-1.3"));
        assert_eq!(dec("2.5").round(0).unwrap(), dec("3"));
        // Rounding to full precision is the identity.
        assert_eq!(dec("1.123456789").round(9).unwrap(), dec("1.123456789"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "1.2.3".parse::<Decimal>(),
            Err(DecimalError::InvalidFormat)
        );
        assert_eq!("".parse::<Decimal>(), Err(DecimalError::InvalidFormat));
        assert_eq!("abc".parse::<Decimal>(), Err(DecimalError::InvalidFormat));
        assert_eq!("1.".parse::<Decimal>(), Err(DecimalError::InvalidFormat));
        assert_eq!(".5".parse::<Decimal>(), Err(DecimalError::InvalidFormat));
        assert_eq!(
            "1.1234567891".parse::<Decimal>(),
            Err(DecimalError::TooManyDecimalPlaces)
        );
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["0", "1", "-1", "149.9", "150.1", "-0.5", "33.333333333"] {
            let d = dec(s);
            assert_eq!(d.to_string(), s);
            assert_eq!(d.to_string().parse::<Decimal>().unwrap(), d);
        }
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(Decimal::try_from_f64(1.5).unwrap(), dec("1.5"));
        assert_eq!(
            Decimal::try_from_f64(f64::NAN),
            Err(DecimalError::InvalidFormat)
        );
        assert_eq!(
            Decimal::try_from_f64(f64::INFINITY),
            Err(DecimalError::InvalidFormat)
        );
    }

    #[test]
    fn test_accessors() {
        assert!(Decimal::ZERO.is_zero());
        assert!(dec("0.000000001").is_positive());
        assert_eq!(dec("-2.5").abs(), dec("2.5"));
        assert_eq!(dec("2.5").neg(), dec("-2.5"));
        assert!(dec("149.9") < dec("150.1"));
    }

    proptest! {
        #[test]
        fn prop_string_round_trip(raw in -1_000_000_000_000_000_000i128..1_000_000_000_000_000_000i128) {
            let d = Decimal::from_raw(raw);
            let back: Decimal = d.to_string().parse().unwrap();
            prop_assert_eq!(back, d);
        }

        #[test]
        fn prop_add_sub_inverse(a in -1_000_000_000i64..1_000_000_000i64,
                                b in -1_000_000_000i64..1_000_000_000i64) {
            let da = Decimal::from_int(a);
            let db = Decimal::from_int(b);
            let sum = da.checked_add(db).unwrap();
            prop_assert_eq!(sum.checked_sub(db).unwrap(), da);
        }
    }
}
