#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use ldb_ir::{CollectionKind, Numeric};
use pretty_assertions::assert_eq;

use super::*;

fn target(domains: &DomainList, not_null: bool) -> AttrTarget<'_> {
    AttrTarget {
        domains,
        slot: 0,
        not_null,
    }
}

#[test]
fn table_follows_domain_kind() {
    let table = SetterTable::for_domain(&Domain::new(DomainKind::Integer));
    assert_eq!(table.op(LexicalType::Int), SetterOp::IntToInt);
    assert_eq!(table.op(LexicalType::Double), SetterOp::Generic);
    assert_eq!(table.op(LexicalType::Str), SetterOp::Mismatch);
    assert_eq!(table.op(LexicalType::Null), SetterOp::Null);

    let table = SetterTable::for_domain(&Domain::new(DomainKind::Date));
    assert_eq!(table.op(LexicalType::Str), SetterOp::Generic);
    assert_eq!(table.op(LexicalType::Time), SetterOp::Mismatch);

    let table = SetterTable::for_domain(&Domain::object(None));
    assert_eq!(table.op(LexicalType::Oid), SetterOp::ObjectRef);
    assert!(table.op(LexicalType::ClassOid).is_deferred());
}

#[test]
fn every_domain_accepts_null_and_numbers() {
    for kind in [DomainKind::Short, DomainKind::Char, DomainKind::Set, DomainKind::Object] {
        let table = SetterTable::for_domain(&Domain::new(kind));
        assert_eq!(table.op(LexicalType::Null), SetterOp::Null, "{kind}");
        assert_ne!(table.op(LexicalType::Int), SetterOp::Mismatch, "{kind}");
    }
}

#[test]
fn ten_digit_literal_overflows_int_but_not_bigint() {
    let int = DomainList::single(Domain::new(DomainKind::Integer));
    assert_eq!(
        convert("2147483648", LexicalType::Int, &int).unwrap_err().code(),
        ErrorCode::L1002
    );
    let bigint = DomainList::single(Domain::new(DomainKind::BigInt));
    assert_eq!(
        convert("2147483648", LexicalType::Int, &bigint).unwrap(),
        TypedValue::BigInt(2_147_483_648)
    );
}

#[test]
fn numeric_domain_rounds_real_tokens() {
    let domains = DomainList::single(Domain::numeric(6, 2));
    assert_eq!(
        convert("12.345", LexicalType::Numeric, &domains).unwrap(),
        TypedValue::Numeric(Numeric::new(1235, 2))
    );
}

#[test]
fn set_direct_marks_fixed_width_slots_bound() {
    let domains = DomainList::single(Domain::new(DomainKind::Integer));
    let table = SetterTable::for_domain(domains.primary());
    let mut image = ObjectImage::with_slots(1);

    let outcome = set_direct(&table, "5", LexicalType::Int, &target(&domains, false), &mut image);
    assert_eq!(outcome.unwrap(), SetOutcome::Written);
    assert_eq!(image.get(0), Some(&TypedValue::Int(5)));
    assert!(image.is_bound(0));

    set_direct(&table, "", LexicalType::Null, &target(&domains, false), &mut image).unwrap();
    assert_eq!(image.get(0), Some(&TypedValue::Null));
    assert!(!image.is_bound(0));
}

#[test]
fn variable_width_slots_carry_no_bound_flag() {
    let domains = DomainList::single(Domain::varchar(10));
    let table = SetterTable::for_domain(domains.primary());
    let mut image = ObjectImage::with_slots(1);
    set_direct(&table, "abc", LexicalType::Str, &target(&domains, false), &mut image).unwrap();
    assert_eq!(image.get(0), Some(&TypedValue::VarChar("abc".into())));
    assert!(!image.is_bound(0));
}

#[test]
fn null_into_not_null_attribute_is_rejected() {
    let domains = DomainList::single(Domain::new(DomainKind::Integer));
    let table = SetterTable::for_domain(domains.primary());
    let mut image = ObjectImage::with_slots(1);
    let err = set_direct(&table, "", LexicalType::Null, &target(&domains, true), &mut image)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1004);
    assert!(image.is_empty());
}

#[test]
fn deferred_tokens_are_left_to_the_caller() {
    let domains = DomainList::single(Domain::collection(CollectionKind::Set, vec![]));
    let table = SetterTable::for_domain(domains.primary());
    let mut image = ObjectImage::with_slots(1);
    let outcome = set_direct(&table, "", LexicalType::Collection, &target(&domains, false), &mut image);
    assert_eq!(outcome.unwrap(), SetOutcome::Collection);
    assert!(image.is_empty());
}

#[test]
fn mismatch_is_a_domain_conflict() {
    let domains = DomainList::single(Domain::new(DomainKind::Integer));
    let err = convert("abc", LexicalType::Str, &domains).unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1001);
    assert_eq!(err.to_string(), "cannot assign string value to INTEGER attribute");
}
