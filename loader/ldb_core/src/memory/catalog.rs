//! Schema catalog held in memory.

use std::cell::Cell;
use std::ops::RangeInclusive;

use ldb_ir::{AttrId, ClassId, DomainList, MethodId, TypedValue};
use rustc_hash::FxHashMap;

use crate::catalog::{
    AttributeNamespace, CatalogError, MethodSignature, PartitionInfo, SchemaAttribute,
    SchemaCatalog,
};

#[derive(Clone, Debug)]
struct Partitioning {
    key_attribute: String,
    ranges: Vec<(ClassId, RangeInclusive<i64>)>,
}

#[derive(Clone, Debug)]
struct ClassDef {
    name: String,
    superclass: Option<ClassId>,
    attributes: Vec<SchemaAttribute>,
    methods: Vec<MethodSignature>,
    internal: bool,
    partitioning: Option<Partitioning>,
}

impl ClassDef {
    fn instance_slots(&self) -> usize {
        self.attributes
            .iter()
            .filter(|a| a.namespace == AttributeNamespace::Instance)
            .count()
    }
}

/// A catalog built up in code.
///
/// Class handles are dense indices; `find_class_by_id` accepts the raw
/// handle value.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    classes: Vec<ClassDef>,
    by_name: FxHashMap<String, ClassId>,
    next_handle: u32,
    lookups: Cell<usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, name: &str) -> ClassId {
        let class = ClassId::new(u32::try_from(self.classes.len()).unwrap_or(u32::MAX));
        self.classes.push(ClassDef {
            name: name.to_owned(),
            superclass: None,
            attributes: Vec::new(),
            methods: Vec::new(),
            internal: false,
            partitioning: None,
        });
        self.by_name.insert(name.to_ascii_lowercase(), class);
        class
    }

    pub fn add_subclass(&mut self, name: &str, superclass: ClassId) -> ClassId {
        let class = self.add_class(name);
        if let Some(def) = self.def_mut(class) {
            def.superclass = Some(superclass);
        }
        class
    }

    /// Add an instance attribute in the next image slot.
    pub fn add_attribute(
        &mut self,
        class: ClassId,
        name: &str,
        domains: impl Into<DomainList>,
    ) -> AttrId {
        self.push_attribute(class, name, AttributeNamespace::Instance, domains.into())
    }

    /// Add a class or shared attribute.
    pub fn add_class_attribute(
        &mut self,
        class: ClassId,
        name: &str,
        namespace: AttributeNamespace,
        domains: impl Into<DomainList>,
    ) -> AttrId {
        self.push_attribute(class, name, namespace, domains.into())
    }

    pub fn set_not_null(&mut self, class: ClassId, name: &str) {
        if let Some(attr) = self
            .def_mut(class)
            .and_then(|def| def.attributes.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)))
        {
            attr.not_null = true;
        }
    }

    /// `arg_count` 0 accepts any number of arguments.
    pub fn add_constructor(&mut self, class: ClassId, name: &str, arg_count: usize) -> MethodId {
        let handle = MethodId::new(self.next_handle());
        if let Some(def) = self.def_mut(class) {
            def.methods.push(MethodSignature {
                handle,
                name: name.to_owned(),
                arg_count,
            });
        }
        handle
    }

    pub fn mark_internal(&mut self, class: ClassId) {
        if let Some(def) = self.def_mut(class) {
            def.internal = true;
        }
    }

    /// Partition `class` by integer ranges of `key_attribute`.
    pub fn partition_by_range(
        &mut self,
        class: ClassId,
        key_attribute: &str,
        ranges: Vec<(ClassId, RangeInclusive<i64>)>,
    ) {
        if let Some(def) = self.def_mut(class) {
            def.partitioning = Some(Partitioning {
                key_attribute: key_attribute.to_owned(),
                ranges,
            });
        }
    }

    /// Attribute lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }

    fn def(&self, class: ClassId) -> Option<&ClassDef> {
        self.classes.get(class.raw() as usize)
    }

    fn def_mut(&mut self, class: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(class.raw() as usize)
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn push_attribute(
        &mut self,
        class: ClassId,
        name: &str,
        namespace: AttributeNamespace,
        domains: DomainList,
    ) -> AttrId {
        let handle = AttrId::new(self.next_handle());
        if let Some(def) = self.def_mut(class) {
            let slot = match namespace {
                AttributeNamespace::Instance => def.instance_slots(),
                AttributeNamespace::Class | AttributeNamespace::Shared => 0,
            };
            def.attributes.push(SchemaAttribute {
                handle,
                name: name.to_owned(),
                namespace,
                domains,
                not_null: false,
                slot,
            });
        }
        handle
    }
}

impl SchemaCatalog for MemoryCatalog {
    fn find_class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    fn find_class_by_id(&self, id: u32) -> Option<ClassId> {
        let class = ClassId::new(id);
        self.def(class).map(|_| class)
    }

    fn class_name(&self, class: ClassId) -> Option<&str> {
        self.def(class).map(|def| def.name.as_str())
    }

    fn get_attribute_descriptor(
        &self,
        class: ClassId,
        name: &str,
        is_class_attribute: bool,
    ) -> Result<SchemaAttribute, CatalogError> {
        self.lookups.set(self.lookups.get() + 1);
        let def = self
            .def(class)
            .ok_or_else(|| CatalogError::Unavailable(format!("no class #{}", class.raw())))?;
        def.attributes
            .iter()
            .find(|a| {
                a.name.eq_ignore_ascii_case(name)
                    && (a.namespace == AttributeNamespace::Class) == is_class_attribute
            })
            .cloned()
            .ok_or_else(|| CatalogError::NoSuchAttribute {
                class: def.name.clone(),
                attribute: name.to_owned(),
            })
    }

    fn get_constructor_method(&self, class: ClassId, name: &str) -> Option<MethodSignature> {
        self.def(class)?
            .methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn is_internal_class(&self, class: ClassId) -> bool {
        self.def(class).is_some_and(|def| def.internal)
    }

    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.def(c).and_then(|def| def.superclass);
        }
        false
    }

    fn partition_info(&self, class: ClassId) -> Option<PartitionInfo> {
        self.def(class)?
            .partitioning
            .as_ref()
            .map(|p| PartitionInfo {
                key_attribute: p.key_attribute.clone(),
            })
    }

    fn select_partition(&self, class: ClassId, key: &TypedValue) -> Option<ClassId> {
        let key = match key {
            TypedValue::Short(v) => i64::from(*v),
            TypedValue::Int(v) => i64::from(*v),
            TypedValue::BigInt(v) => *v,
            _ => return None,
        };
        self.def(class)?
            .partitioning
            .as_ref()?
            .ranges
            .iter()
            .find(|(_, range)| range.contains(&key))
            .map(|(partition, _)| *partition)
    }
}
