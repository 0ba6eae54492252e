#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use ldb_ir::DomainKind;
use pretty_assertions::assert_eq;

use super::*;

fn int_set() -> Domain {
    Domain::collection(CollectionKind::Set, vec![Domain::new(DomainKind::Integer)])
}

#[test]
fn set_drops_duplicates_on_finish() {
    let mut builder = CollectionBuilder::new(int_set());
    for token in ["1", "2", "2", "3"] {
        builder.push_token(token, LexicalType::Int).unwrap();
    }
    let value = builder.finish().unwrap().unwrap();
    assert_eq!(value.to_string(), "{1, 2, 3}");
}

#[test]
fn nested_open_leaves_outer_untouched() {
    let mut builder = CollectionBuilder::new(int_set());
    builder.push_token("1", LexicalType::Int).unwrap();

    let err = builder.open_nested();
    assert_eq!(err.code(), ErrorCode::L1009);
    assert!(builder.is_swallowing());
    builder.push_token("99", LexicalType::Int).unwrap();
    builder.push_token("98", LexicalType::Int).unwrap();
    assert!(!builder.close());

    assert!(!builder.is_swallowing());
    assert_eq!(builder.len(), 1);
    builder.push_token("2", LexicalType::Int).unwrap();
    assert!(builder.close());
    assert_eq!(builder.len(), 2);
}

#[test]
fn elements_coerce_to_the_element_domain() {
    let domain = Domain::collection(
        CollectionKind::Sequence,
        vec![Domain::new(DomainKind::Short)],
    );
    let mut builder = CollectionBuilder::new(domain);
    builder.push_token("70000", LexicalType::Int).unwrap();
    let err = builder.finish().unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1002);
}

#[test]
fn discarding_builder_yields_nothing() {
    let mut builder = CollectionBuilder::discarding();
    builder.push_token("1", LexicalType::Int).unwrap();
    assert!(builder.is_empty());
    assert_eq!(builder.finish().unwrap(), None);
}

#[test]
fn reference_domains_default_to_any_object() {
    let builder = CollectionBuilder::new(Domain::collection(CollectionKind::Set, Vec::new()));
    assert_eq!(builder.reference_domains().primary().kind, DomainKind::Object);
    assert_eq!(builder.domain().kind, DomainKind::Set);
}
