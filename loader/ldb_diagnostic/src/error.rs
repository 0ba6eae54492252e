//! Load errors raised by conversion, resolution and the session.

use thiserror::Error;

use crate::ErrorCode;

/// What went wrong.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum LoadErrorKind {
    #[error("cannot assign {source_type} value to {domain} attribute")]
    DomainConflict { source_type: String, domain: String },

    #[error("value {value} overflows {domain}")]
    Overflow { value: String, domain: String },

    #[error("cannot convert '{value}' to {target}")]
    DateConversion { value: String, target: &'static str },

    #[error("NULL is not allowed")]
    NullNotAllowed,

    #[error("expected {expected} attribute values, found {found}")]
    MissingAttributes { expected: usize, found: usize },

    #[error("expected {expected} constructor arguments, found {found}")]
    MissingArguments { expected: usize, found: usize },

    #[error("constructor {method} accepts no more arguments")]
    UnexpectedArgument { method: String },

    #[error("more values than the {expected} attributes of class {class}")]
    ValueOverflow { class: String, expected: usize },

    #[error("collections cannot be nested")]
    NestedSet,

    #[error("class {class} is not in the domain {domain}")]
    ObjectDomainMismatch { class: String, domain: String },

    #[error("class object reference requires an unrestricted object domain")]
    ClassObjectReference,

    #[error("instance {ordinal} of class {class} was referenced before its constructor ran")]
    ForwardConstructor { class: String, ordinal: u32 },

    #[error("partition key selects {partition}, not class {class}")]
    PartitionMismatch { class: String, partition: String },

    #[error("partition key {attribute} of class {class} is not listed")]
    MissingPartitionKey { class: String, attribute: String },

    #[error("object domain names more than one class")]
    AmbiguousDomain,

    #[error("cannot reference instances of internal class {class}")]
    InternalReference { class: String },

    #[error("unknown class {name}")]
    UnknownClass { name: String },

    #[error("unknown class id {id}")]
    UnknownClassId { id: u32 },

    #[error("schema lookup failed: {message}")]
    SchemaLookupFailure { message: String },

    #[error("{attribute} is not a {namespace} attribute of class {class}")]
    InvalidClassAttr {
        class: String,
        attribute: String,
        namespace: &'static str,
    },

    #[error("class {class} has no constructor {method}")]
    InvalidConstructor { class: String, method: String },

    #[error("object store failure: {message}")]
    StoreFailure { message: String },

    #[error("out of memory")]
    MemoryAllocation,
}

impl LoadErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadErrorKind::DomainConflict { .. } => ErrorCode::L1001,
            LoadErrorKind::Overflow { .. } => ErrorCode::L1002,
            LoadErrorKind::DateConversion { .. } => ErrorCode::L1003,
            LoadErrorKind::NullNotAllowed => ErrorCode::L1004,
            LoadErrorKind::MissingAttributes { .. } => ErrorCode::L1005,
            LoadErrorKind::MissingArguments { .. } => ErrorCode::L1006,
            LoadErrorKind::UnexpectedArgument { .. } => ErrorCode::L1007,
            LoadErrorKind::ValueOverflow { .. } => ErrorCode::L1008,
            LoadErrorKind::NestedSet => ErrorCode::L1009,
            LoadErrorKind::ObjectDomainMismatch { .. } => ErrorCode::L1010,
            LoadErrorKind::ClassObjectReference => ErrorCode::L1011,
            LoadErrorKind::ForwardConstructor { .. } => ErrorCode::L1012,
            LoadErrorKind::PartitionMismatch { .. } => ErrorCode::L1013,
            LoadErrorKind::MissingPartitionKey { .. } => ErrorCode::L1014,
            LoadErrorKind::AmbiguousDomain => ErrorCode::L2001,
            LoadErrorKind::InternalReference { .. } => ErrorCode::L2002,
            LoadErrorKind::UnknownClass { .. } => ErrorCode::L2003,
            LoadErrorKind::UnknownClassId { .. } => ErrorCode::L2004,
            LoadErrorKind::SchemaLookupFailure { .. } => ErrorCode::L2005,
            LoadErrorKind::InvalidClassAttr { .. } => ErrorCode::L2006,
            LoadErrorKind::InvalidConstructor { .. } => ErrorCode::L2007,
            LoadErrorKind::StoreFailure { .. } => ErrorCode::L2008,
            LoadErrorKind::MemoryAllocation => ErrorCode::L2009,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.code().is_fatal()
    }
}

/// A load error with the attribute and source line it was raised for.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[error("{kind}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub attribute: Option<String>,
    pub line: Option<u32>,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind) -> Self {
        LoadError {
            kind,
            attribute: None,
            line: None,
        }
    }

    /// Attach the attribute name unless one is already set.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        if self.attribute.is_none() {
            self.attribute = Some(attribute.into());
        }
        self
    }

    /// Attach the source line unless one is already set.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn overflow(value: impl Into<String>, domain: impl ToString) -> Self {
        LoadErrorKind::Overflow {
            value: value.into(),
            domain: domain.to_string(),
        }
        .into()
    }

    /// `source_type` is a lexical type or a value type name.
    pub fn domain_conflict(source_type: impl ToString, domain: impl ToString) -> Self {
        LoadErrorKind::DomainConflict {
            source_type: source_type.to_string(),
            domain: domain.to_string(),
        }
        .into()
    }

    pub fn store(message: impl Into<String>) -> Self {
        LoadErrorKind::StoreFailure {
            message: message.into(),
        }
        .into()
    }
}

impl From<LoadErrorKind> for LoadError {
    fn from(kind: LoadErrorKind) -> Self {
        LoadError::new(kind)
    }
}

/// Result alias used across the loader crates.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests;
