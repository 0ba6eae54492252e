#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use ldb_ir::{ClassId, Domain, DomainKind, ObjectId, Oid};
use pretty_assertions::assert_eq;

use super::*;
use crate::memory::{MemoryCatalog, MemoryStore};

fn setup() -> (MemoryCatalog, MemoryStore, ClassId) {
    let mut catalog = MemoryCatalog::new();
    let employee = catalog.add_class("employee");
    catalog.add_attribute(employee, "id", Domain::new(DomainKind::Integer));
    (catalog, MemoryStore::new(), employee)
}

fn origin(class: ClassId, ordinal: Option<u32>, object: Option<ObjectId>) -> ReferenceOrigin {
    ReferenceOrigin {
        class,
        ordinal,
        object,
        class_attribute: false,
    }
}

#[test]
fn forward_reference_creates_one_placeholder() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let from = origin(employee, Some(1), None);

    let first = resolver
        .find_instance(&catalog, &mut store, employee, 7, &from)
        .unwrap();
    let second = resolver
        .find_instance(&catalog, &mut store, employee, 7, &from)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.pending().len(), 1);
    assert_eq!(store.placeholder_count(), 1);
    assert_eq!(store.reserved(), vec![(employee, 7, first)]);
    let entry = resolver.reserved(employee, 7).unwrap();
    assert_eq!(entry.flags, InstanceFlags::RESERVED);
}

#[test]
fn self_reference_touches_no_placeholder() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let own = store.create_placeholder(employee).unwrap();

    let found = resolver
        .find_instance(&catalog, &mut store, employee, 3, &origin(employee, Some(3), Some(own)))
        .unwrap();

    assert_eq!(found, own);
    assert!(resolver.pending().is_empty());
    assert!(resolver.table(employee).is_none());
}

#[test]
fn class_attribute_reference_is_flagged() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let from = ReferenceOrigin {
        class_attribute: true,
        ..origin(employee, None, None)
    };
    resolver
        .find_instance(&catalog, &mut store, employee, 1, &from)
        .unwrap();
    let entry = resolver.reserved(employee, 1).unwrap();
    assert!(entry.flags.contains(InstanceFlags::CLASS_ATT_REF));
}

#[test]
fn internal_classes_cannot_be_referenced() {
    let (mut catalog, mut store, employee) = setup();
    let system = catalog.add_class("db_root");
    catalog.mark_internal(system);
    let mut resolver = OidResolver::new(10);

    let err = resolver
        .find_instance(&catalog, &mut store, system, 1, &origin(employee, None, None))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::L2002);
    assert!(err.is_fatal());
}

#[test]
fn defining_a_placeholder_clears_the_reservation() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let placeholder = resolver
        .find_instance(&catalog, &mut store, employee, 2, &origin(employee, Some(1), None))
        .unwrap();
    assert_eq!(resolver.count_defaulted(), 1);

    let oid = store.oid_of(placeholder).unwrap();
    assert!(resolver.record_instance(employee, 2, placeholder, oid));
    assert_eq!(resolver.count_defaulted(), 0);
    // Already queued by the reference.
    assert_eq!(resolver.pending().len(), 1);
}

#[test]
fn exchange_runs_in_batches() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(2);
    for ordinal in 1..=5 {
        resolver
            .find_instance(&catalog, &mut store, employee, ordinal, &origin(employee, None, None))
            .unwrap();
    }

    assert_eq!(resolver.exchange_pending(&mut store).unwrap(), 5);
    assert_eq!(store.exchange_batches(), vec![2, 2, 1]);
    assert!(resolver.pending().is_empty());

    let table = resolver.table(employee).unwrap();
    for (_, entry) in table.entries() {
        assert!(matches!(entry.oid, Oid::Permanent(_)));
        assert_eq!(store.oid_of(entry.object), Some(entry.oid));
    }
}

#[test]
fn exchange_skips_objects_already_permanent() {
    let (catalog, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let object = resolver
        .find_instance(&catalog, &mut store, employee, 1, &origin(employee, None, None))
        .unwrap();
    store.exchange_batch(&[object]).unwrap();

    assert_eq!(resolver.exchange_pending(&mut store).unwrap(), 0);
    assert_eq!(store.exchange_batches(), vec![1]);
}

#[test]
fn plain_instances_are_queued_until_exchanged() {
    let (_, mut store, employee) = setup();
    let mut resolver = OidResolver::new(10);
    let object = store.create_placeholder(employee).unwrap();
    let oid = store.oid_of(object).unwrap();

    assert!(!resolver.record_instance(employee, 4, object, oid));
    resolver.note_insert(employee);
    assert_eq!(resolver.pending().len(), 1);
    assert_eq!(resolver.table(employee).unwrap().total_inserts(), 1);

    resolver.discard_pending();
    assert!(resolver.pending().is_empty());
}
