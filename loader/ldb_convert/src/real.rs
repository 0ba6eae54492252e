//! Real and monetary literals.
//!
//! Parsing never consults the process locale: `.` is always the decimal
//! separator.

use ldb_diagnostic::{LoadError, LoadResult};
use ldb_ir::{Currency, DomainKind, LexicalType, Monetary};

/// Parse a real token as a double, rejecting values outside the IEEE
/// double range.
///
/// Text that is not a real number at all is a domain conflict.
pub fn parse_double(text: &str) -> LoadResult<f64> {
    let text = text.trim();
    let body = text.strip_suffix(['f', 'F']).unwrap_or(text);
    finite(body, text, LexicalType::Double, DomainKind::Double)
}

fn finite(body: &str, text: &str, lexical: LexicalType, domain: DomainKind) -> LoadResult<f64> {
    let value = body
        .parse::<f64>()
        .map_err(|_| LoadError::domain_conflict(lexical, domain))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LoadError::overflow(text, domain))
    }
}

/// Narrow a double to a float, rejecting values outside the IEEE single
/// range.
#[allow(
    clippy::cast_possible_truncation,
    reason = "range is checked against f32::MAX first"
)]
pub fn narrow_to_float(value: f64, text: &str) -> LoadResult<f32> {
    if value.abs() > f64::from(f32::MAX) {
        return Err(LoadError::overflow(text.trim(), DomainKind::Float));
    }
    Ok(value as f32)
}

/// Parse a monetary token: an optional currency symbol followed by an
/// amount.
pub fn parse_monetary(text: &str) -> LoadResult<Monetary> {
    let text = text.trim();
    let (currency, amount) = Currency::split_prefix(text);
    let amount = finite(amount.trim(), text, LexicalType::Monetary, DomainKind::Monetary)?;
    Ok(Monetary { amount, currency })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use ldb_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn doubles_accept_exponents_and_float_suffix() {
        assert_eq!(parse_double("1.5e3").unwrap(), 1500.0);
        assert_eq!(parse_double("2.5F").unwrap(), 2.5);
        assert_eq!(parse_double("1e999").unwrap_err().code(), ErrorCode::L1002);
    }

    #[test]
    fn malformed_reals_are_domain_conflicts() {
        assert_eq!(parse_double("abc").unwrap_err().code(), ErrorCode::L1001);
        assert_eq!(parse_double("1.2.3").unwrap_err().code(), ErrorCode::L1001);
        assert_eq!(parse_monetary("$abc").unwrap_err().code(), ErrorCode::L1001);
        assert_eq!(parse_monetary("$1e999").unwrap_err().code(), ErrorCode::L1002);
    }

    #[test]
    fn floats_reject_values_past_single_range() {
        assert_eq!(narrow_to_float(1.0e39, "1e39").unwrap_err().code(), ErrorCode::L1002);
        assert_eq!(narrow_to_float(0.5, "0.5").unwrap(), 0.5_f32);
    }

    #[test]
    fn monetary_currency_prefixes() {
        let won = parse_monetary("\\1500").unwrap();
        assert_eq!(won.currency, Currency::Won);
        assert_eq!(won.amount, 1500.0);
        assert_eq!(parse_monetary("$12.25").unwrap().currency, Currency::Dollar);
        assert_eq!(parse_monetary("\u{20ac}3").unwrap().currency, Currency::Euro);
    }
}
