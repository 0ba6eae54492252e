//! Element converters: a token to its natural typed value.
//!
//! Used where no attribute-specific setter applies: collection elements,
//! constructor arguments, class-level attributes and the generic setter.
//! The result still has to be coerced to the target domain.

use ldb_diagnostic::{LoadError, LoadErrorKind, LoadResult};
use ldb_ir::{BitString, DomainKind, LexicalType, Numeric, NumericError, TypedValue, Zone};

use crate::integer::{classify, IntegerLiteral};
use crate::{real, temporal};

/// Convert a token to the value its lexical type naturally denotes.
///
/// Object references need the resolver and are rejected here; a
/// collection token here means a collection nested in another.
pub fn convert_element(token: &str, lexical: LexicalType) -> LoadResult<TypedValue> {
    let value = match lexical {
        LexicalType::Null => TypedValue::Null,
        LexicalType::Int => match classify(token)? {
            IntegerLiteral::Int(v) => TypedValue::Int(v),
            IntegerLiteral::BigInt(v) => TypedValue::BigInt(v),
            IntegerLiteral::Numeric(n) => TypedValue::Numeric(n),
        },
        LexicalType::Float => {
            TypedValue::Float(real::narrow_to_float(real::parse_double(token)?, token)?)
        }
        LexicalType::Double => TypedValue::Double(real::parse_double(token)?),
        LexicalType::Numeric => match Numeric::parse(token) {
            Ok(n) => TypedValue::Numeric(n),
            // Too many digits for NUMERIC: keep the magnitude as a double.
            Err(NumericError::Overflow) => TypedValue::Double(real::parse_double(token)?),
            Err(NumericError::Syntax) => {
                return Err(LoadError::domain_conflict(lexical, DomainKind::Numeric))
            }
        },
        LexicalType::Str => TypedValue::VarChar(token.to_owned()),
        LexicalType::NStr => TypedValue::VarNChar(token.to_owned()),
        LexicalType::BitStr => TypedValue::VarBit(
            BitString::from_binary(token)
                .ok_or_else(|| LoadError::domain_conflict(lexical, DomainKind::VarBit))?,
        ),
        LexicalType::HexStr => TypedValue::VarBit(
            BitString::from_hex(token)
                .ok_or_else(|| LoadError::domain_conflict(lexical, DomainKind::VarBit))?,
        ),
        LexicalType::Date => TypedValue::Date(temporal::parse_date(token)?),
        LexicalType::Time => TypedValue::Time(temporal::parse_time(token)?),
        LexicalType::TimeTz | LexicalType::TimeLtz => {
            let (body, zone) = temporal::split_zone(token);
            TypedValue::TimeTz(temporal::parse_time(body)?, zone_for(lexical, zone))
        }
        LexicalType::Timestamp => TypedValue::Timestamp(temporal::parse_timestamp(token)?),
        LexicalType::TimestampTz | LexicalType::TimestampLtz => {
            let (body, zone) = temporal::split_zone(token);
            TypedValue::TimestampTz(temporal::parse_timestamp(body)?, zone_for(lexical, zone))
        }
        LexicalType::DateTime => TypedValue::DateTime(temporal::parse_datetime(token)?),
        LexicalType::DateTimeTz | LexicalType::DateTimeLtz => {
            let (body, zone) = temporal::split_zone(token);
            TypedValue::DateTimeTz(temporal::parse_datetime(body)?, zone_for(lexical, zone))
        }
        LexicalType::Monetary => TypedValue::Monetary(real::parse_monetary(token)?),
        LexicalType::Collection => return Err(LoadErrorKind::NestedSet.into()),
        LexicalType::Oid | LexicalType::ClassOid => {
            return Err(LoadError::domain_conflict(lexical, DomainKind::Object))
        }
    };
    Ok(value)
}

/// Local-zone literals always use the session zone; zoned literals fall
/// back to it when no zone is written.
fn zone_for(lexical: LexicalType, written: Option<Zone>) -> Zone {
    match lexical {
        LexicalType::TimeLtz | LexicalType::TimestampLtz | LexicalType::DateTimeLtz => Zone::Local,
        _ => written.unwrap_or(Zone::Local),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use chrono::FixedOffset;
    use ldb_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn integers_take_their_natural_width() {
        assert_eq!(convert_element("12", LexicalType::Int).unwrap(), TypedValue::Int(12));
        assert_eq!(
            convert_element("4294967296", LexicalType::Int).unwrap(),
            TypedValue::BigInt(4_294_967_296)
        );
    }

    #[test]
    fn long_numerics_fall_back_to_double() {
        let token = format!("1{}.5", "0".repeat(40));
        assert!(matches!(
            convert_element(&token, LexicalType::Numeric).unwrap(),
            TypedValue::Double(_)
        ));
    }

    #[test]
    fn zoned_literals_carry_their_zone() {
        let value = convert_element("10:00 -02:00", LexicalType::TimeTz).unwrap();
        let TypedValue::TimeTz(_, zone) = value else {
            panic!("expected TIMETZ, got {value:?}");
        };
        assert_eq!(zone, Zone::Offset(FixedOffset::west_opt(7200).unwrap()));

        let value = convert_element("10:00 -02:00", LexicalType::TimeLtz).unwrap();
        assert!(matches!(value, TypedValue::TimeTz(_, Zone::Local)));
    }

    #[test]
    fn nested_collection_and_references_are_rejected() {
        assert_eq!(
            convert_element("", LexicalType::Collection).unwrap_err().code(),
            ErrorCode::L1009
        );
        assert_eq!(
            convert_element("", LexicalType::Oid).unwrap_err().code(),
            ErrorCode::L1001
        );
    }

    #[test]
    fn bad_bit_literal_is_a_domain_conflict() {
        assert_eq!(
            convert_element("012", LexicalType::BitStr).unwrap_err().code(),
            ErrorCode::L1001
        );
    }
}
