#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn ten_digit_literals_split_on_leading_digit() {
    assert_eq!(classify("1999999999").unwrap(), IntegerLiteral::Int(1_999_999_999));
    assert_eq!(classify("0000000042").unwrap(), IntegerLiteral::Int(42));
    assert_eq!(
        classify("2147483648").unwrap(),
        IntegerLiteral::BigInt(2_147_483_648)
    );
}

#[test]
fn nineteen_digit_literals_starting_with_nine_are_numeric() {
    assert_eq!(
        classify("8999999999999999999").unwrap(),
        IntegerLiteral::BigInt(8_999_999_999_999_999_999)
    );
    assert!(matches!(
        classify("9223372036854775807").unwrap(),
        IntegerLiteral::Numeric(_)
    ));
}

#[test]
fn int_target_overflows_where_bigint_succeeds() {
    let err = to_int("3000000000").unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1002);
    assert_eq!(to_bigint("3000000000").unwrap(), 3_000_000_000);
}

#[test]
fn short_target_checks_range() {
    assert_eq!(to_short("-32768").unwrap(), -32768);
    assert_eq!(to_short("32768").unwrap_err().code(), ErrorCode::L1002);
    assert_eq!(to_short("00000000000000000000012").unwrap(), 12);
}

#[test]
fn numeric_target_checks_precision() {
    let domain = Domain::numeric(4, 1);
    assert_eq!(to_numeric("123", &domain).unwrap(), Numeric::new(1230, 1));
    assert_eq!(to_numeric("1234", &domain).unwrap_err().code(), ErrorCode::L1002);
}

#[test]
fn non_digits_are_a_domain_conflict() {
    assert_eq!(classify("12x").unwrap_err().code(), ErrorCode::L1001);
}

proptest! {
    #[test]
    fn any_i32_is_accepted_by_int(v in any::<i32>()) {
        prop_assert_eq!(to_int(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn any_i64_is_accepted_by_bigint(v in any::<i64>()) {
        prop_assert_eq!(to_bigint(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn values_past_i32_overflow_int(v in (i64::from(i32::MAX) + 1)..i64::MAX) {
        prop_assert!(to_int(&v.to_string()).is_err());
    }
}
