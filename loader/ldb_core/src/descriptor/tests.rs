#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_convert::SetterOp;
use ldb_ir::{CollectionKind, DomainKind};
use pretty_assertions::assert_eq;

use super::*;
use crate::memory::MemoryCatalog;

fn catalog() -> (MemoryCatalog, ClassId) {
    let mut catalog = MemoryCatalog::new();
    let class = catalog.add_class("config");
    catalog.add_attribute(class, "count", Domain::new(DomainKind::Integer));
    catalog.add_attribute(
        class,
        "tags",
        Domain::collection(CollectionKind::Set, vec![Domain::new(DomainKind::Integer)]),
    );
    (catalog, class)
}

#[test]
fn setter_table_follows_the_primary_domain() {
    let (catalog, class) = catalog();
    let attribute = catalog.get_attribute_descriptor(class, "count", false).unwrap();
    let descriptor = AttributeDescriptor::new("count", attribute, false);

    assert_eq!(descriptor.setters().op(LexicalType::Int), SetterOp::IntToInt);
    assert_eq!(descriptor.setters().op(LexicalType::Str), SetterOp::Mismatch);
    assert!(descriptor.collection_domain().is_none());
    assert_eq!(descriptor.target().slot, 0);
}

#[test]
fn collection_attributes_keep_their_collection_domain() {
    let (catalog, class) = catalog();
    let attribute = catalog.get_attribute_descriptor(class, "TAGS", false).unwrap();
    let descriptor = AttributeDescriptor::new("TAGS", attribute, false);

    assert_eq!(descriptor.name(), "TAGS");
    assert_eq!(descriptor.collection_domain().unwrap().kind, DomainKind::Set);
    assert_eq!(descriptor.target().slot, 1);
}

#[test]
fn refresh_rebuilds_every_entry() {
    let (catalog, class) = catalog();
    let mut table = DescriptorTable::new();
    for name in ["count", "tags"] {
        let attribute = catalog.get_attribute_descriptor(class, name, false).unwrap();
        table.push(AttributeDescriptor::new(name, attribute, false));
    }
    table.get_mut(0).unwrap().buffer(Buffered::Token {
        lexical: LexicalType::Int,
        text: "1".into(),
    });
    let before = catalog.lookup_count();

    table.refresh(&catalog, class, false).unwrap();

    assert_eq!(catalog.lookup_count(), before + 2);
    assert_eq!(table.generation(), 1);
    assert_eq!(table.len(), 2);
    assert!(table.get_mut(0).unwrap().take_buffered().is_none());
}

#[test]
fn refresh_fails_when_an_attribute_is_gone() {
    let (catalog, class) = catalog();
    let mut table = DescriptorTable::new();
    let attribute = catalog.get_attribute_descriptor(class, "count", false).unwrap();
    table.push(AttributeDescriptor::new("count", attribute, false));

    let err = table.refresh(&catalog, class, true).unwrap_err();
    assert!(matches!(err, CatalogError::NoSuchAttribute { .. }));
}
