//! Accumulates the elements of one set, multiset or sequence value.

use ldb_convert::{coerce_collection, convert_element};
use ldb_diagnostic::{LoadError, LoadErrorKind, LoadResult};
use ldb_ir::{CollectionKind, CollectionValue, Domain, DomainList, LexicalType, TypedValue};

/// Builder for the collection currently open on an instance line.
///
/// Collections do not nest: a nested open is reported and everything up to
/// its matching close is swallowed, leaving the outer collection as it was.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionBuilder {
    domain: Domain,
    value: CollectionValue,
    nested: u32,
    discard: bool,
}

impl CollectionBuilder {
    /// Collect into `domain`, a set, multiset or sequence domain.
    pub fn new(domain: Domain) -> Self {
        let kind = domain
            .kind
            .collection_kind()
            .unwrap_or(CollectionKind::Sequence);
        CollectionBuilder {
            domain,
            value: CollectionValue::new(kind),
            nested: 0,
            discard: false,
        }
    }

    /// A builder that parses its elements but produces no value.
    pub fn discarding() -> Self {
        CollectionBuilder {
            discard: true,
            ..CollectionBuilder::new(Domain::collection(CollectionKind::Sequence, Vec::new()))
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Domains an instance reference element is checked against.
    pub fn reference_domains(&self) -> DomainList {
        DomainList::from_alternatives(self.domain.elements.clone())
            .unwrap_or_else(|| DomainList::single(Domain::object(None)))
    }

    /// Inside a rejected nested collection.
    pub fn is_swallowing(&self) -> bool {
        self.nested > 0
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Record a nested open and return the error to report.
    pub fn open_nested(&mut self) -> LoadError {
        self.nested += 1;
        LoadErrorKind::NestedSet.into()
    }

    /// Handle a close. Returns `true` when it closes this collection.
    pub fn close(&mut self) -> bool {
        if self.nested > 0 {
            self.nested -= 1;
            false
        } else {
            true
        }
    }

    /// Convert an element token and add it.
    pub fn push_token(&mut self, text: &str, lexical: LexicalType) -> LoadResult<()> {
        if self.is_swallowing() {
            return Ok(());
        }
        if lexical == LexicalType::Collection {
            return Err(LoadErrorKind::NestedSet.into());
        }
        let value = convert_element(text, lexical)?;
        self.push(value);
        Ok(())
    }

    /// Add an already converted element.
    pub fn push(&mut self, value: TypedValue) {
        if !self.is_swallowing() && !self.discard {
            self.value.push(value);
        }
    }

    /// Coerce the elements to the element domains. `None` for a
    /// discarding builder.
    pub fn finish(self) -> LoadResult<Option<TypedValue>> {
        if self.discard {
            return Ok(None);
        }
        coerce_collection(self.value, &self.domain).map(|c| Some(TypedValue::Collection(c)))
    }
}

#[cfg(test)]
mod tests;
