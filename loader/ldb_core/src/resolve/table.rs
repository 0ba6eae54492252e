//! Per-class ordinal to object mapping.

use bitflags::bitflags;
use ldb_ir::{ClassId, ObjectId, Oid, Ordinal};
use rustc_hash::FxHashMap;

bitflags! {
    /// State of one resolution table entry.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct InstanceFlags: u8 {
        /// Referenced before its line was loaded.
        const RESERVED = 1 << 0;
        /// The forward reference came from a class-level value.
        const CLASS_ATT_REF = 1 << 1;
    }
}

/// One known instance of a class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InstanceEntry {
    pub object: ObjectId,
    pub oid: Oid,
    pub flags: InstanceFlags,
}

impl InstanceEntry {
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.flags.contains(InstanceFlags::RESERVED)
    }
}

/// Ordinal to object mapping for one class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolutionTable {
    class: ClassId,
    entries: FxHashMap<Ordinal, InstanceEntry>,
    total_inserts: u64,
}

impl ResolutionTable {
    pub fn new(class: ClassId) -> Self {
        ResolutionTable {
            class,
            entries: FxHashMap::default(),
            total_inserts: 0,
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn find(&self, ordinal: Ordinal) -> Option<&InstanceEntry> {
        self.entries.get(&ordinal)
    }

    pub(crate) fn insert(&mut self, ordinal: Ordinal, entry: InstanceEntry) -> Option<InstanceEntry> {
        self.entries.insert(ordinal, entry)
    }

    /// Mark a reserved ordinal as defined. Returns `false` if it was not
    /// reserved.
    pub(crate) fn define(&mut self, ordinal: Ordinal) -> bool {
        match self.entries.get_mut(&ordinal) {
            Some(entry) if entry.is_reserved() => {
                entry.flags.remove(InstanceFlags::RESERVED);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_oid(&mut self, ordinal: Ordinal, oid: Oid) {
        if let Some(entry) = self.entries.get_mut(&ordinal) {
            entry.oid = oid;
        }
    }

    pub(crate) fn record_insert(&mut self) {
        self.total_inserts += 1;
    }

    /// Instances inserted into this class during the load.
    pub fn total_inserts(&self) -> u64 {
        self.total_inserts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still waiting for their defining line.
    pub fn reserved_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_reserved()).count()
    }

    /// Entries ordered by ordinal.
    pub fn entries(&self) -> Vec<(Ordinal, InstanceEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(o, e)| (*o, *e)).collect();
        entries.sort_unstable_by_key(|(ordinal, _)| *ordinal);
        entries
    }
}
