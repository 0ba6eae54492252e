//! The backing object store as seen by the loader.

use ldb_diagnostic::LoadError;
use ldb_ir::{AttrId, ClassId, MethodId, ObjectId, ObjectImage, Oid, Ordinal, PermanentOid, TypedValue};
use thiserror::Error;

/// A failed store operation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[error("{operation}: {message}")]
pub struct StoreError {
    pub operation: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError {
            operation,
            message: message.into(),
        }
    }
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        LoadError::store(err.to_string())
    }
}

/// Where a class-level value is written.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassValueKind {
    /// Class attribute value.
    Class,
    /// Shared attribute value.
    Shared,
    /// Default value of an instance attribute.
    Default,
}

/// Object storage operations used during a load.
///
/// Objects are addressed by workspace handles. A new object starts with a
/// temporary OID; [`exchange_batch`](ObjectStore::exchange_batch) replaces
/// it with a permanent one.
pub trait ObjectStore {
    /// Create an empty object of `class` with a temporary OID.
    fn create_placeholder(&mut self, class: ClassId) -> Result<ObjectId, StoreError>;

    fn oid_of(&self, object: ObjectId) -> Option<Oid>;

    /// Note that `object` stands in for a forward-referenced instance.
    fn reserve(&mut self, class: ClassId, ordinal: Ordinal, object: ObjectId)
        -> Result<(), StoreError>;

    /// Exchange temporary OIDs for permanent ones, one result per object in
    /// order. One call is one round trip.
    fn exchange_batch(&mut self, objects: &[ObjectId]) -> Result<Vec<PermanentOid>, StoreError>;

    fn flush_class(&mut self, class: ClassId) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Allow the workspace to cull `object` once it is written.
    fn release(&mut self, object: ObjectId);

    fn set_pinned(&mut self, object: ObjectId, pinned: bool);

    fn write_instance(&mut self, object: ObjectId, image: &ObjectImage) -> Result<(), StoreError>;

    /// Forget an object that was never written.
    fn drop_object(&mut self, object: ObjectId);

    fn set_class_value(
        &mut self,
        class: ClassId,
        attribute: AttrId,
        kind: ClassValueKind,
        value: TypedValue,
    ) -> Result<(), StoreError>;

    /// Call a constructor method; returns the object it produced.
    fn invoke_constructor(
        &mut self,
        class: ClassId,
        method: MethodId,
        args: Vec<TypedValue>,
    ) -> Result<ObjectId, StoreError>;

    fn update_statistics(&mut self, _class: ClassId) -> Result<(), StoreError> {
        Ok(())
    }
}
