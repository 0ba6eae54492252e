//! Object store held in memory.

use std::sync::Arc;

use ldb_ir::{
    AttrId, ClassId, MethodId, ObjectId, ObjectImage, Oid, Ordinal, PermanentOid, TypedValue,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::store::{ClassValueKind, ObjectStore, StoreError};

#[derive(Clone, Debug)]
struct StoredObject {
    class: ClassId,
    oid: Oid,
    image: Option<ObjectImage>,
    pinned: bool,
    releasable: bool,
    committed: bool,
}

/// A class-level value written during the load.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassValue {
    pub class: ClassId,
    pub attribute: AttrId,
    pub kind: ClassValueKind,
    pub value: TypedValue,
}

/// A recorded constructor call.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorCall {
    pub class: ClassId,
    pub method: MethodId,
    pub args: Vec<TypedValue>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_object: u64,
    next_temp: u32,
    next_page: u32,
    objects: FxHashMap<ObjectId, StoredObject>,
    reserved: Vec<(ClassId, Ordinal, ObjectId)>,
    class_values: Vec<(ClassValue, bool)>,
    exchange_batches: Vec<usize>,
    flushed: Vec<ClassId>,
    statistics: Vec<ClassId>,
    constructor_calls: Vec<ConstructorCall>,
    commits: usize,
    rollbacks: usize,
    fail_next_commit: bool,
}

impl StoreState {
    fn create(&mut self, class: ClassId) -> ObjectId {
        self.next_object += 1;
        self.next_temp += 1;
        let object = ObjectId::new(self.next_object);
        self.objects.insert(
            object,
            StoredObject {
                class,
                oid: Oid::Temporary(self.next_temp),
                image: None,
                pinned: false,
                releasable: false,
                committed: false,
            },
        );
        object
    }

    fn object_mut(&mut self, object: ObjectId, operation: &'static str) -> Result<&mut StoredObject, StoreError> {
        self.objects
            .get_mut(&object)
            .ok_or_else(|| StoreError::new(operation, format!("unknown object {object:?}")))
    }
}

/// A store that keeps objects in a shared map.
///
/// Clones share state, so a test can keep a handle while the session owns
/// the store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail.
    pub fn fail_next_commit(&self) {
        self.state.lock().fail_next_commit = true;
    }

    pub fn image(&self, object: ObjectId) -> Option<ObjectImage> {
        self.state.lock().objects.get(&object)?.image.clone()
    }

    pub fn class_of(&self, object: ObjectId) -> Option<ClassId> {
        self.state.lock().objects.get(&object).map(|o| o.class)
    }

    pub fn is_pinned(&self, object: ObjectId) -> bool {
        self.state.lock().objects.get(&object).is_some_and(|o| o.pinned)
    }

    pub fn is_releasable(&self, object: ObjectId) -> bool {
        self.state.lock().objects.get(&object).is_some_and(|o| o.releasable)
    }

    /// Written instances of `class`, ordered by handle.
    pub fn instances_of(&self, class: ClassId) -> Vec<(ObjectId, ObjectImage)> {
        let state = self.state.lock();
        let mut instances: Vec<_> = state
            .objects
            .iter()
            .filter(|(_, o)| o.class == class)
            .filter_map(|(id, o)| o.image.clone().map(|image| (*id, image)))
            .collect();
        instances.sort_unstable_by_key(|(id, _)| *id);
        instances
    }

    /// Objects created but never written.
    pub fn placeholder_count(&self) -> usize {
        self.state
            .lock()
            .objects
            .values()
            .filter(|o| o.image.is_none())
            .count()
    }

    /// Written instances that survived every rollback so far and were
    /// committed.
    pub fn committed_count(&self) -> usize {
        self.state
            .lock()
            .objects
            .values()
            .filter(|o| o.committed && o.image.is_some())
            .count()
    }

    pub fn reserved(&self) -> Vec<(ClassId, Ordinal, ObjectId)> {
        self.state.lock().reserved.clone()
    }

    pub fn class_values(&self, class: ClassId) -> Vec<ClassValue> {
        self.state
            .lock()
            .class_values
            .iter()
            .filter(|(v, _)| v.class == class)
            .map(|(v, _)| v.clone())
            .collect()
    }

    /// Size of each exchange round trip, in call order.
    pub fn exchange_batches(&self) -> Vec<usize> {
        self.state.lock().exchange_batches.clone()
    }

    pub fn flushed_classes(&self) -> Vec<ClassId> {
        self.state.lock().flushed.clone()
    }

    pub fn statistics_updates(&self) -> Vec<ClassId> {
        self.state.lock().statistics.clone()
    }

    pub fn constructor_calls(&self) -> Vec<ConstructorCall> {
        self.state.lock().constructor_calls.clone()
    }

    pub fn commit_count(&self) -> usize {
        self.state.lock().commits
    }

    pub fn rollback_count(&self) -> usize {
        self.state.lock().rollbacks
    }
}

impl ObjectStore for MemoryStore {
    fn create_placeholder(&mut self, class: ClassId) -> Result<ObjectId, StoreError> {
        Ok(self.state.lock().create(class))
    }

    fn oid_of(&self, object: ObjectId) -> Option<Oid> {
        self.state.lock().objects.get(&object).map(|o| o.oid)
    }

    fn reserve(
        &mut self,
        class: ClassId,
        ordinal: Ordinal,
        object: ObjectId,
    ) -> Result<(), StoreError> {
        self.state.lock().reserved.push((class, ordinal, object));
        Ok(())
    }

    fn exchange_batch(&mut self, objects: &[ObjectId]) -> Result<Vec<PermanentOid>, StoreError> {
        let mut state = self.state.lock();
        state.exchange_batches.push(objects.len());
        let mut oids = Vec::with_capacity(objects.len());
        for &object in objects {
            state.next_page += 1;
            let oid = PermanentOid::new(0, state.next_page, 0);
            state.object_mut(object, "exchange")?.oid = Oid::Permanent(oid);
            oids.push(oid);
        }
        Ok(oids)
    }

    fn flush_class(&mut self, class: ClassId) -> Result<(), StoreError> {
        self.state.lock().flushed.push(class);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_commit) {
            return Err(StoreError::new("commit", "injected failure"));
        }
        state.commits += 1;
        state.objects.values_mut().for_each(|o| o.committed = true);
        state.class_values.iter_mut().for_each(|(_, committed)| *committed = true);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.rollbacks += 1;
        state.objects.retain(|_, o| o.committed);
        state.class_values.retain(|(_, committed)| *committed);
        Ok(())
    }

    fn release(&mut self, object: ObjectId) {
        if let Some(o) = self.state.lock().objects.get_mut(&object) {
            o.releasable = true;
        }
    }

    fn set_pinned(&mut self, object: ObjectId, pinned: bool) {
        if let Some(o) = self.state.lock().objects.get_mut(&object) {
            o.pinned = pinned;
        }
    }

    fn write_instance(&mut self, object: ObjectId, image: &ObjectImage) -> Result<(), StoreError> {
        self.state.lock().object_mut(object, "write")?.image = Some(image.clone());
        Ok(())
    }

    fn drop_object(&mut self, object: ObjectId) {
        self.state.lock().objects.remove(&object);
    }

    fn set_class_value(
        &mut self,
        class: ClassId,
        attribute: AttrId,
        kind: ClassValueKind,
        value: TypedValue,
    ) -> Result<(), StoreError> {
        let value = ClassValue {
            class,
            attribute,
            kind,
            value,
        };
        self.state.lock().class_values.push((value, false));
        Ok(())
    }

    fn invoke_constructor(
        &mut self,
        class: ClassId,
        method: MethodId,
        args: Vec<TypedValue>,
    ) -> Result<ObjectId, StoreError> {
        let mut state = self.state.lock();
        let object = state.create(class);
        state.constructor_calls.push(ConstructorCall {
            class,
            method,
            args,
        });
        Ok(object)
    }

    fn update_statistics(&mut self, class: ClassId) -> Result<(), StoreError> {
        self.state.lock().statistics.push(class);
        Ok(())
    }
}
