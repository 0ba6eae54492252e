//! The schema catalog as seen by the loader.

use ldb_convert::ClassHierarchy;
use ldb_diagnostic::{LoadError, LoadErrorKind};
use ldb_ir::{AttrId, ClassId, DomainList, MethodId, TypedValue};
use thiserror::Error;

/// Which storage an attribute lives in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AttributeNamespace {
    Instance,
    Class,
    Shared,
}

impl AttributeNamespace {
    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeNamespace::Instance => "instance",
            AttributeNamespace::Class => "class",
            AttributeNamespace::Shared => "shared",
        }
    }
}

/// A resolved schema attribute.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SchemaAttribute {
    pub handle: AttrId,
    pub name: String,
    pub namespace: AttributeNamespace,
    pub domains: DomainList,
    pub not_null: bool,
    /// Position in the instance image.
    pub slot: usize,
}

/// A class method that builds instances.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodSignature {
    pub handle: MethodId,
    pub name: String,
    /// Declared argument count; 0 accepts any number.
    pub arg_count: usize,
}

/// Partitioning of a class by one key attribute.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PartitionInfo {
    pub key_attribute: String,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum CatalogError {
    #[error("class {class} has no attribute {attribute}")]
    NoSuchAttribute { class: String, attribute: String },

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for LoadError {
    fn from(err: CatalogError) -> Self {
        LoadErrorKind::SchemaLookupFailure {
            message: err.to_string(),
        }
        .into()
    }
}

/// Schema lookups the loader needs.
///
/// Class names are matched case-insensitively.
pub trait SchemaCatalog {
    fn find_class_by_name(&self, name: &str) -> Option<ClassId>;

    /// Consulted when a numeric class id is not in the session's `%id` map.
    fn find_class_by_id(&self, id: u32) -> Option<ClassId>;

    fn class_name(&self, class: ClassId) -> Option<&str>;

    /// Look up an attribute by name. `is_class_attribute` selects the
    /// class-level namespaces (class and shared) instead of instance
    /// attributes.
    fn get_attribute_descriptor(
        &self,
        class: ClassId,
        name: &str,
        is_class_attribute: bool,
    ) -> Result<SchemaAttribute, CatalogError>;

    fn get_constructor_method(&self, class: ClassId, name: &str) -> Option<MethodSignature>;

    /// System classes the loader never writes to.
    fn is_internal_class(&self, class: ClassId) -> bool;

    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        class == ancestor
    }

    fn partition_info(&self, _class: ClassId) -> Option<PartitionInfo> {
        None
    }

    /// The partition a key value belongs to.
    fn select_partition(&self, _class: ClassId, _key: &TypedValue) -> Option<ClassId> {
        None
    }
}

/// Display name of a class, falling back to its handle.
pub(crate) fn class_display<C: SchemaCatalog + ?Sized>(catalog: &C, class: ClassId) -> String {
    match catalog.class_name(class) {
        Some(name) => name.to_owned(),
        None => format!("#{}", class.raw()),
    }
}

/// Adapts a catalog to the reference domain checks.
pub struct CatalogHierarchy<'a, C: ?Sized>(pub &'a C);

impl<C: SchemaCatalog + ?Sized> ClassHierarchy for CatalogHierarchy<'_, C> {
    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.0.is_subclass_of(class, ancestor)
    }

    fn display_name(&self, class: ClassId) -> String {
        class_display(self.0, class)
    }
}
