#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn char_pads_to_precision() {
    assert_eq!(fit_chars("ab", &Domain::char(4)).unwrap(), "ab  ");
}

#[test]
fn varchar_keeps_length() {
    assert_eq!(fit_chars("ab", &Domain::varchar(4)).unwrap(), "ab");
}

#[test]
fn trailing_spaces_are_truncated() {
    assert_eq!(fit_chars("abc   ", &Domain::varchar(3)).unwrap(), "abc");
    assert_eq!(fit_chars("abc   ", &Domain::char(4)).unwrap(), "abc ");
}

#[test]
fn non_space_excess_overflows() {
    let err = fit_chars("abcd", &Domain::char(3)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1002);
}

#[test]
fn precision_counts_characters_not_bytes() {
    assert_eq!(
        fit_chars("\u{c548}\u{b155}", &Domain::new(DomainKind::VarNChar).with_precision(2))
            .unwrap(),
        "\u{c548}\u{b155}"
    );
}

#[test]
fn bit_excess_must_be_zero() {
    let bits = BitString::from_hex("f0").unwrap();
    assert_eq!(fit_bits(&bits, &Domain::varbit(4)).unwrap().to_string(), "X'f'");
    assert_eq!(
        fit_bits(&bits, &Domain::varbit(3)).unwrap_err().code(),
        ErrorCode::L1002
    );
}

#[test]
fn fixed_bit_is_zero_extended() {
    let bits = BitString::from_binary("1").unwrap();
    assert_eq!(fit_bits(&bits, &Domain::bit(4)).unwrap().to_string(), "X'8'");
    assert_eq!(fit_bits(&bits, &Domain::varbit(4)).unwrap().len(), 1);
}

proptest! {
    #[test]
    fn space_padding_never_overflows(text in "[a-z]{0,8}", pad in 0usize..8) {
        let padded = format!("{text}{}", " ".repeat(pad));
        let fitted = fit_chars(&padded, &Domain::varchar(8)).unwrap();
        prop_assert_eq!(fitted.trim_end(), text.as_str());
    }

    #[test]
    fn fixed_char_always_has_precision_length(text in "[a-z]{0,6}", precision in 6u32..12) {
        let fitted = fit_chars(&text, &Domain::char(precision)).unwrap();
        prop_assert_eq!(fitted.chars().count(), precision as usize);
    }

    #[test]
    fn non_space_past_precision_overflows(text in "[a-z]{5,10}") {
        prop_assert!(fit_chars(&text, &Domain::char(4)).is_err());
    }
}
