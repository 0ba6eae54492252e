//! Integer literal width selection.
//!
//! An integer token is parsed at the narrowest width its digit count
//! guarantees to fit: up to 9 digits (or 10 digits starting with `0`/`1`)
//! as a 32-bit integer, up to 18 digits (or 19 not starting with `9`) as a
//! 64-bit integer, anything longer as a NUMERIC.

use ldb_diagnostic::{LoadError, LoadResult};
use ldb_ir::{Domain, DomainKind, LexicalType, Numeric, NumericError};

/// Digits that always fit an INTEGER.
pub const MAX_DIGITS_FOR_INT: usize = 9;
/// Digits that always fit a BIGINT.
pub const MAX_DIGITS_FOR_BIGINT: usize = 18;

/// An integer token at the width chosen by its digit count.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IntegerLiteral {
    Int(i32),
    BigInt(i64),
    Numeric(Numeric),
}

impl IntegerLiteral {
    /// Exact value, rounded when a NUMERIC carries a fraction.
    pub fn to_i128(self) -> Option<i128> {
        match self {
            IntegerLiteral::Int(v) => Some(i128::from(v)),
            IntegerLiteral::BigInt(v) => Some(i128::from(v)),
            IntegerLiteral::Numeric(n) => n.round_to_integer(),
        }
    }

    pub fn to_numeric(self) -> Numeric {
        match self {
            IntegerLiteral::Int(v) => Numeric::from_i64(i64::from(v)),
            IntegerLiteral::BigInt(v) => Numeric::from_i64(v),
            IntegerLiteral::Numeric(n) => n,
        }
    }
}

fn digits_of(text: &str) -> &str {
    text.strip_prefix(['-', '+']).unwrap_or(text)
}

/// Classify an integer token by its digit count.
pub fn classify(text: &str) -> LoadResult<IntegerLiteral> {
    let text = text.trim();
    let digits = digits_of(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LoadError::domain_conflict(LexicalType::Int, DomainKind::Integer));
    }
    let len = digits.len();
    let first = digits.as_bytes()[0];

    if len <= MAX_DIGITS_FOR_INT || (len == MAX_DIGITS_FOR_INT + 1 && matches!(first, b'0' | b'1'))
    {
        return text
            .parse::<i32>()
            .map(IntegerLiteral::Int)
            .map_err(|_| LoadError::overflow(text, DomainKind::Integer));
    }
    if len <= MAX_DIGITS_FOR_BIGINT || (len == MAX_DIGITS_FOR_BIGINT + 1 && first != b'9') {
        return text
            .parse::<i64>()
            .map(IntegerLiteral::BigInt)
            .map_err(|_| LoadError::overflow(text, DomainKind::BigInt));
    }
    Numeric::parse(text)
        .map(IntegerLiteral::Numeric)
        .map_err(|err| match err {
            NumericError::Overflow => LoadError::overflow(text, DomainKind::Numeric),
            NumericError::Syntax => LoadError::domain_conflict(LexicalType::Int, DomainKind::Numeric),
        })
}

/// Parse an integer token for a SHORT attribute.
pub fn to_short(text: &str) -> LoadResult<i16> {
    classify(text)?
        .to_i128()
        .and_then(|v| i16::try_from(v).ok())
        .ok_or_else(|| LoadError::overflow(text.trim(), DomainKind::Short))
}

/// Parse an integer token for an INTEGER attribute.
pub fn to_int(text: &str) -> LoadResult<i32> {
    match classify(text)? {
        IntegerLiteral::Int(v) => Ok(v),
        other => other
            .to_i128()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| LoadError::overflow(text.trim(), DomainKind::Integer)),
    }
}

/// Parse an integer token for a BIGINT attribute.
pub fn to_bigint(text: &str) -> LoadResult<i64> {
    match classify(text)? {
        IntegerLiteral::Int(v) => Ok(i64::from(v)),
        IntegerLiteral::BigInt(v) => Ok(v),
        other @ IntegerLiteral::Numeric(_) => other
            .to_i128()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| LoadError::overflow(text.trim(), DomainKind::BigInt)),
    }
}

/// Parse an integer token for a `NUMERIC(p,s)` attribute.
pub fn to_numeric(text: &str, domain: &Domain) -> LoadResult<Numeric> {
    classify(text)?
        .to_numeric()
        .fit(domain.precision, domain.scale)
        .ok_or_else(|| LoadError::overflow(text.trim(), domain))
}

#[cfg(test)]
mod tests;
