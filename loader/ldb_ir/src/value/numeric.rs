//! Fixed-point decimal values for NUMERIC attributes.

use std::fmt;

use crate::domain::MAX_NUMERIC_PRECISION;

/// Why a decimal literal was rejected.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumericError {
    /// Not a decimal literal.
    Syntax,
    /// More significant digits than NUMERIC can hold.
    Overflow,
}

/// A decimal stored as an unscaled integer and a scale.
///
/// `unscaled = 12345, scale = 2` is `123.45`. 38 digits always fit in an
/// `i128`, so every NUMERIC value is exact.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Numeric {
    unscaled: i128,
    scale: u8,
}

#[inline]
fn pow10(exp: u32) -> Option<i128> {
    10_i128.checked_pow(exp)
}

impl Numeric {
    pub const fn new(unscaled: i128, scale: u8) -> Self {
        Numeric { unscaled, scale }
    }

    pub fn from_i64(value: i64) -> Self {
        Numeric::new(i128::from(value), 0)
    }

    #[inline]
    pub const fn unscaled(self) -> i128 {
        self.unscaled
    }

    #[inline]
    pub const fn scale(self) -> u8 {
        self.scale
    }

    /// Number of decimal digits needed to hold this value at its scale.
    pub fn precision(self) -> u32 {
        let mut magnitude = self.unscaled.unsigned_abs();
        let mut digits = 1;
        while magnitude >= 10 {
            magnitude /= 10;
            digits += 1;
        }
        digits.max(u32::from(self.scale))
    }

    /// Parse `[+-]digits[.digits]`.
    pub fn parse(text: &str) -> Result<Numeric, NumericError> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(NumericError::Syntax);
        }

        let mut unscaled: i128 = 0;
        for byte in int_part.bytes().chain(frac_part.bytes()) {
            if !byte.is_ascii_digit() {
                return Err(NumericError::Syntax);
            }
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(byte - b'0')))
                .ok_or(NumericError::Overflow)?;
        }

        let scale = u8::try_from(frac_part.len()).map_err(|_| NumericError::Overflow)?;
        let value = Numeric::new(if negative { -unscaled } else { unscaled }, scale);
        if value.precision() > MAX_NUMERIC_PRECISION {
            return Err(NumericError::Overflow);
        }
        Ok(value)
    }

    /// Change the scale, rounding half away from zero when digits are
    /// dropped. `None` when the result does not fit.
    pub fn rescale(self, scale: u8) -> Option<Numeric> {
        if scale >= self.scale {
            let factor = pow10(u32::from(scale - self.scale))?;
            return Some(Numeric::new(self.unscaled.checked_mul(factor)?, scale));
        }
        let factor = pow10(u32::from(self.scale - scale))?;
        let quotient = self.unscaled / factor;
        let remainder = (self.unscaled % factor).unsigned_abs();
        let half = factor.unsigned_abs() / 2;
        let rounded = if remainder >= half {
            quotient.checked_add(self.unscaled.signum())?
        } else {
            quotient
        };
        Some(Numeric::new(rounded, scale))
    }

    /// Fit into `NUMERIC(precision, scale)`.
    pub fn fit(self, precision: u32, scale: u8) -> Option<Numeric> {
        let value = self.rescale(scale)?;
        (value.precision() <= precision).then_some(value)
    }

    /// Round to the nearest integer.
    pub fn round_to_integer(self) -> Option<i128> {
        self.rescale(0).map(Numeric::unscaled)
    }

    #[allow(clippy::cast_precision_loss, reason = "NUMERIC to DOUBLE is lossy by definition")]
    pub fn to_f64(self) -> f64 {
        self.unscaled as f64 / 10_f64.powi(i32::from(self.scale))
    }

    /// Convert a double, rounding to `scale` fractional digits.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "magnitude is checked against the NUMERIC limit first"
    )]
    pub fn from_f64(value: f64, scale: u8) -> Option<Numeric> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * 10_f64.powi(i32::from(scale))).round();
        if scaled.abs() >= 1e38 {
            return None;
        }
        Some(Numeric::new(scaled as i128, scale))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let scale = usize::from(self.scale);
        if scale == 0 {
            return write!(f, "{sign}{magnitude}");
        }
        let padded = format!("{magnitude:0>width$}", width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}
