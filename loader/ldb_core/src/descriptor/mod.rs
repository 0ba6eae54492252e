//! Attribute descriptors: the per-class binding of listed attributes to
//! schema attributes and setter tables.
//!
//! Schema handles are only valid within one transaction, so the whole table
//! is rebuilt from the catalog after every commit.

use ldb_convert::{AttrTarget, SetterTable};
use ldb_ir::{ClassId, Domain, LexicalType, TypedValue};

use crate::catalog::{CatalogError, SchemaAttribute, SchemaCatalog};

/// A constructor-line value held until the line ends.
#[derive(Clone, Debug, PartialEq)]
pub enum Buffered {
    Token { lexical: LexicalType, text: String },
    /// A reference or collection, already resolved.
    Value(TypedValue),
}

/// One listed attribute or constructor argument.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
    name: String,
    attribute: SchemaAttribute,
    setters: SetterTable,
    collection: Option<Domain>,
    argument: bool,
    buffered: Option<Buffered>,
}

impl AttributeDescriptor {
    pub fn new(name: &str, attribute: SchemaAttribute, argument: bool) -> Self {
        let setters = SetterTable::for_domain(attribute.domains.primary());
        let collection = attribute.domains.collection_domain().cloned();
        AttributeDescriptor {
            name: name.to_owned(),
            attribute,
            setters,
            collection,
            argument,
            buffered: None,
        }
    }

    /// The name as listed in the load file.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self) -> &SchemaAttribute {
        &self.attribute
    }

    pub fn setters(&self) -> &SetterTable {
        &self.setters
    }

    /// The collection domain values of this attribute are built in.
    pub fn collection_domain(&self) -> Option<&Domain> {
        self.collection.as_ref()
    }

    pub fn is_argument(&self) -> bool {
        self.argument
    }

    pub fn target(&self) -> AttrTarget<'_> {
        AttrTarget {
            domains: &self.attribute.domains,
            slot: self.attribute.slot,
            not_null: self.attribute.not_null,
        }
    }

    pub fn buffer(&mut self, value: Buffered) {
        self.buffered = Some(value);
    }

    pub fn take_buffered(&mut self) -> Option<Buffered> {
        self.buffered.take()
    }
}

/// Descriptors of one class context, in listed order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescriptorTable {
    entries: Vec<AttributeDescriptor>,
    /// Bumped on every rebuild.
    generation: u32,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: AttributeDescriptor) -> usize {
        self.entries.push(descriptor);
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AttributeDescriptor> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AttributeDescriptor> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeDescriptor> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, AttributeDescriptor> {
        self.entries.iter_mut()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop every buffered constructor value.
    pub fn clear_buffers(&mut self) {
        for entry in &mut self.entries {
            entry.buffered = None;
        }
    }

    /// Look every attribute up again and rebuild its setter table.
    pub fn refresh<C: SchemaCatalog + ?Sized>(
        &mut self,
        catalog: &C,
        class: ClassId,
        is_class_attribute: bool,
    ) -> Result<(), CatalogError> {
        let mut rebuilt = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let attribute =
                catalog.get_attribute_descriptor(class, &entry.name, is_class_attribute)?;
            rebuilt.push(AttributeDescriptor::new(&entry.name, attribute, entry.argument));
        }
        self.entries = rebuilt;
        self.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
