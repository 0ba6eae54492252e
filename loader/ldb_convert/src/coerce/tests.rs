#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use ldb_diagnostic::ErrorCode;
use ldb_ir::{CollectionKind, ObjectId};
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn null_casts_to_anything() {
    assert_eq!(
        coerce(TypedValue::Null, &Domain::new(DomainKind::Date)).unwrap(),
        TypedValue::Null
    );
}

#[test]
fn integers_narrow_with_range_checks() {
    let short = Domain::new(DomainKind::Short);
    assert_eq!(coerce(TypedValue::Int(7), &short).unwrap(), TypedValue::Short(7));
    assert_eq!(
        coerce(TypedValue::BigInt(70_000), &short).unwrap_err().code(),
        ErrorCode::L1002
    );
    let int = Domain::new(DomainKind::Integer);
    assert_eq!(coerce(TypedValue::Double(2.5), &int).unwrap(), TypedValue::Int(3));
    assert_eq!(
        coerce(TypedValue::Double(1e300), &int).unwrap_err().code(),
        ErrorCode::L1002
    );
}

#[test]
fn numeric_targets_round_to_scale() {
    let domain = Domain::numeric(5, 2);
    assert_eq!(
        coerce(TypedValue::Double(3.14159), &domain).unwrap(),
        TypedValue::Numeric(Numeric::new(314, 2))
    );
    assert_eq!(
        coerce(TypedValue::Int(12_345), &domain).unwrap_err().code(),
        ErrorCode::L1002
    );
}

#[test]
fn strings_cast_to_temporal_and_numbers() {
    assert_eq!(
        coerce(TypedValue::VarChar("2020-02-29".into()), &Domain::new(DomainKind::Date)).unwrap(),
        TypedValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
    );
    assert_eq!(
        coerce(TypedValue::VarChar("42".into()), &Domain::new(DomainKind::BigInt)).unwrap(),
        TypedValue::BigInt(42)
    );
}

#[test]
fn numbers_cast_to_padded_char() {
    assert_eq!(
        coerce(TypedValue::Int(42), &Domain::char(4)).unwrap(),
        TypedValue::Char("42  ".into())
    );
}

#[test]
fn incompatible_casts_are_domain_conflicts() {
    let err = coerce(TypedValue::Date(NaiveDate::MIN), &Domain::new(DomainKind::Integer)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1001);
    let err = coerce(TypedValue::Object(ObjectId::new(1)), &Domain::varchar(10)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1001);
}

#[test]
fn timestamp_from_date_is_midnight() {
    let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    assert_eq!(
        coerce(TypedValue::Date(date), &Domain::new(DomainKind::Timestamp)).unwrap(),
        TypedValue::Timestamp(date.and_time(NaiveTime::MIN))
    );
    let early = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
    assert_eq!(
        coerce(TypedValue::Date(early), &Domain::new(DomainKind::Timestamp))
            .unwrap_err()
            .code(),
        ErrorCode::L1002
    );
}

#[test]
fn collections_cast_elements_and_take_domain_kind() {
    let mut source = CollectionValue::new(CollectionKind::Sequence);
    source.push(TypedValue::Int(1));
    source.push(TypedValue::BigInt(1));
    source.push(TypedValue::Int(2));
    let domain = Domain::collection(CollectionKind::Set, vec![Domain::new(DomainKind::Short)]);

    let TypedValue::Collection(out) = coerce(TypedValue::Collection(source), &domain).unwrap() else {
        panic!("expected a collection");
    };
    assert_eq!(out.kind(), CollectionKind::Set);
    assert_eq!(out.elements(), &[TypedValue::Short(1), TypedValue::Short(2)]);
}

#[test]
fn collection_elements_try_each_element_domain() {
    let mut source = CollectionValue::new(CollectionKind::Multiset);
    source.push(TypedValue::VarChar("x".into()));
    let domain = Domain::collection(
        CollectionKind::Multiset,
        vec![Domain::new(DomainKind::Integer), Domain::varchar(4)],
    );
    let TypedValue::Collection(out) = coerce(TypedValue::Collection(source), &domain).unwrap() else {
        panic!("expected a collection");
    };
    assert_eq!(out.elements(), &[TypedValue::VarChar("x".into())]);
}
