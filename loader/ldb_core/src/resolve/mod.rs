//! OID resolution: instance references by `(class, ordinal)`.
//!
//! A reference to an instance that has not been loaded yet gets a
//! placeholder object with a temporary OID. Every object registered in a
//! resolution table while its OID is still temporary is queued, and
//! [`OidResolver::exchange_pending`] trades the queue for permanent OIDs in
//! batches. Callers exchange as soon as [`OidResolver::batch_full`] reports a
//! full batch.

mod table;

use ldb_diagnostic::{LoadErrorKind, LoadResult};
use ldb_ir::{ClassId, ObjectId, Oid, Ordinal};
use rustc_hash::FxHashMap;

pub use table::{InstanceEntry, InstanceFlags, ResolutionTable};

use crate::catalog::{class_display, SchemaCatalog};
use crate::store::{ObjectStore, StoreError};

/// An object waiting for a permanent OID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PlaceholderEntry {
    pub object: ObjectId,
    pub class: ClassId,
    pub ordinal: Ordinal,
}

/// Where a reference was written.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ReferenceOrigin {
    pub class: ClassId,
    /// Ordinal of the instance being loaded, if it has one.
    pub ordinal: Option<Ordinal>,
    /// Object of the instance being loaded.
    pub object: Option<ObjectId>,
    /// The reference is a class, shared or default value.
    pub class_attribute: bool,
}

/// Resolution tables for every class plus the exchange queue.
#[derive(Clone, Debug)]
pub struct OidResolver {
    tables: FxHashMap<ClassId, ResolutionTable>,
    pending: Vec<PlaceholderEntry>,
    batch_size: usize,
}

impl OidResolver {
    pub fn new(batch_size: usize) -> Self {
        OidResolver {
            tables: FxHashMap::default(),
            pending: Vec::new(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn table(&self, class: ClassId) -> Option<&ResolutionTable> {
        self.tables.get(&class)
    }

    /// Every table, ordered by class.
    pub fn tables(&self) -> Vec<&ResolutionTable> {
        let mut tables: Vec<_> = self.tables.values().collect();
        tables.sort_unstable_by_key(|t| t.class());
        tables
    }

    pub fn pending(&self) -> &[PlaceholderEntry] {
        &self.pending
    }

    /// The exchange queue holds at least one batch.
    pub fn batch_full(&self) -> bool {
        self.pending.len() >= self.batch_size
    }

    /// The entry for `ordinal` if it is a placeholder still waiting for its
    /// defining line.
    pub fn reserved(&self, class: ClassId, ordinal: Ordinal) -> Option<InstanceEntry> {
        self.table(class)
            .and_then(|t| t.find(ordinal))
            .filter(|e| e.is_reserved())
            .copied()
    }

    /// Resolve a reference to instance `ordinal` of `class`.
    ///
    /// Known instances and existing placeholders resolve to their object; a
    /// reference to the instance being loaded resolves to its own object.
    /// Anything else gets a new placeholder.
    pub fn find_instance<C, S>(
        &mut self,
        catalog: &C,
        store: &mut S,
        class: ClassId,
        ordinal: Ordinal,
        origin: &ReferenceOrigin,
    ) -> LoadResult<ObjectId>
    where
        C: SchemaCatalog + ?Sized,
        S: ObjectStore + ?Sized,
    {
        if let Some(entry) = self.table(class).and_then(|t| t.find(ordinal)) {
            return Ok(entry.object);
        }
        if origin.class == class && origin.ordinal == Some(ordinal) {
            if let Some(object) = origin.object {
                return Ok(object);
            }
        }
        if catalog.is_internal_class(class) {
            return Err(LoadErrorKind::InternalReference {
                class: class_display(catalog, class),
            }
            .into());
        }

        let object = store.create_placeholder(class)?;
        let oid = store
            .oid_of(object)
            .ok_or_else(|| StoreError::new("create placeholder", "object has no OID"))?;
        store.reserve(class, ordinal, object)?;

        let mut flags = InstanceFlags::RESERVED;
        if origin.class_attribute {
            flags |= InstanceFlags::CLASS_ATT_REF;
        }
        self.table_mut(class)
            .insert(ordinal, InstanceEntry { object, oid, flags });
        self.register(class, ordinal, object, oid);
        tracing::trace!(class = class.raw(), ordinal, "placeholder created");
        Ok(object)
    }

    /// Record a loaded instance. Returns `true` when it defined a
    /// placeholder.
    pub fn record_instance(
        &mut self,
        class: ClassId,
        ordinal: Ordinal,
        object: ObjectId,
        oid: Oid,
    ) -> bool {
        let table = self.table_mut(class);
        if table.define(ordinal) {
            return true;
        }
        let entry = InstanceEntry {
            object,
            oid,
            flags: InstanceFlags::empty(),
        };
        if table.insert(ordinal, entry).is_some() {
            tracing::warn!(class = class.raw(), ordinal, "instance ordinal redefined");
        }
        self.register(class, ordinal, object, oid);
        false
    }

    /// Count an insert into `class`, with or without an ordinal.
    pub fn note_insert(&mut self, class: ClassId) {
        self.table_mut(class).record_insert();
    }

    /// Exchange every queued object that still has a temporary OID.
    ///
    /// Returns how many objects were exchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(pending = self.pending.len()))]
    pub fn exchange_pending<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<usize, StoreError> {
        let pending = std::mem::take(&mut self.pending);
        let waiting: Vec<PlaceholderEntry> = pending
            .into_iter()
            .filter(|p| store.oid_of(p.object).is_some_and(Oid::is_temporary))
            .collect();

        for chunk in waiting.chunks(self.batch_size) {
            let objects: Vec<ObjectId> = chunk.iter().map(|p| p.object).collect();
            let oids = store.exchange_batch(&objects)?;
            if oids.len() != objects.len() {
                return Err(StoreError::new(
                    "exchange",
                    format!("expected {} identifiers, got {}", objects.len(), oids.len()),
                ));
            }
            for (entry, oid) in chunk.iter().zip(oids) {
                if let Some(table) = self.tables.get_mut(&entry.class) {
                    table.set_oid(entry.ordinal, Oid::Permanent(oid));
                }
            }
        }
        tracing::debug!(exchanged = waiting.len(), "temporary OIDs exchanged");
        Ok(waiting.len())
    }

    /// Drop the exchange queue after a rollback.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Placeholders never defined by a line of their own.
    pub fn count_defaulted(&self) -> u64 {
        self.tables.values().map(|t| t.reserved_count() as u64).sum()
    }

    /// Forget every table, as before a fresh pass over the input.
    pub fn clear(&mut self) {
        self.tables.clear();
        self.pending.clear();
    }

    fn table_mut(&mut self, class: ClassId) -> &mut ResolutionTable {
        self.tables
            .entry(class)
            .or_insert_with(|| ResolutionTable::new(class))
    }

    fn register(&mut self, class: ClassId, ordinal: Ordinal, object: ObjectId, oid: Oid) {
        if oid.is_temporary() {
            self.pending.push(PlaceholderEntry {
                object,
                class,
                ordinal,
            });
        }
    }
}

#[cfg(test)]
mod tests;
