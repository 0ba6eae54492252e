//! Attribute domains: the declared type of an attribute plus its parameters.

use std::fmt;

use smallvec::SmallVec;

use crate::ClassId;

/// Largest NUMERIC precision the loader accepts.
pub const MAX_NUMERIC_PRECISION: u32 = 38;

/// Largest declared length of a variable-width string or bit string.
pub const MAX_VARIABLE_PRECISION: u32 = 1_073_741_823;

/// Concrete type of a domain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DomainKind {
    Short,
    Integer,
    BigInt,
    Float,
    Double,
    Numeric,
    Monetary,
    Char,
    VarChar,
    NChar,
    VarNChar,
    Bit,
    VarBit,
    Date,
    Time,
    TimeTz,
    TimeLtz,
    Timestamp,
    TimestampTz,
    TimestampLtz,
    DateTime,
    DateTimeTz,
    DateTimeLtz,
    Object,
    Set,
    Multiset,
    Sequence,
}

impl DomainKind {
    pub const fn name(self) -> &'static str {
        match self {
            DomainKind::Short => "SHORT",
            DomainKind::Integer => "INTEGER",
            DomainKind::BigInt => "BIGINT",
            DomainKind::Float => "FLOAT",
            DomainKind::Double => "DOUBLE",
            DomainKind::Numeric => "NUMERIC",
            DomainKind::Monetary => "MONETARY",
            DomainKind::Char => "CHAR",
            DomainKind::VarChar => "VARCHAR",
            DomainKind::NChar => "NCHAR",
            DomainKind::VarNChar => "VARNCHAR",
            DomainKind::Bit => "BIT",
            DomainKind::VarBit => "VARBIT",
            DomainKind::Date => "DATE",
            DomainKind::Time => "TIME",
            DomainKind::TimeTz => "TIMETZ",
            DomainKind::TimeLtz => "TIMELTZ",
            DomainKind::Timestamp => "TIMESTAMP",
            DomainKind::TimestampTz => "TIMESTAMPTZ",
            DomainKind::TimestampLtz => "TIMESTAMPLTZ",
            DomainKind::DateTime => "DATETIME",
            DomainKind::DateTimeTz => "DATETIMETZ",
            DomainKind::DateTimeLtz => "DATETIMELTZ",
            DomainKind::Object => "OBJECT",
            DomainKind::Set => "SET",
            DomainKind::Multiset => "MULTISET",
            DomainKind::Sequence => "SEQUENCE",
        }
    }

    /// Fixed-width values occupy a fixed slot and carry a bound flag in the
    /// instance image; variable-width values do not.
    pub const fn is_fixed_width(self) -> bool {
        !matches!(
            self,
            DomainKind::VarChar
                | DomainKind::VarNChar
                | DomainKind::VarBit
                | DomainKind::Set
                | DomainKind::Multiset
                | DomainKind::Sequence
        )
    }

    pub const fn collection_kind(self) -> Option<CollectionKind> {
        match self {
            DomainKind::Set => Some(CollectionKind::Set),
            DomainKind::Multiset => Some(CollectionKind::Multiset),
            DomainKind::Sequence => Some(CollectionKind::Sequence),
            _ => None,
        }
    }

    pub const fn is_collection(self) -> bool {
        self.collection_kind().is_some()
    }

    /// Default precision used when a domain is built without one.
    pub const fn default_precision(self) -> u32 {
        match self {
            DomainKind::Numeric => 15,
            DomainKind::Char | DomainKind::NChar | DomainKind::Bit => 1,
            DomainKind::VarChar | DomainKind::VarNChar | DomainKind::VarBit => {
                MAX_VARIABLE_PRECISION
            }
            _ => 0,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collection flavour: duplicates and ordering rules differ.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CollectionKind {
    /// Unordered, no duplicates.
    Set,
    /// Unordered, duplicates kept.
    Multiset,
    /// Ordered, duplicates kept.
    Sequence,
}

impl CollectionKind {
    pub const fn domain_kind(self) -> DomainKind {
        match self {
            CollectionKind::Set => DomainKind::Set,
            CollectionKind::Multiset => DomainKind::Multiset,
            CollectionKind::Sequence => DomainKind::Sequence,
        }
    }
}

/// A single domain.
///
/// `class` is only meaningful for `Object` (`None` is the unrestricted
/// object domain); `elements` only for collections, where it lists the
/// acceptable element domains in preference order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Domain {
    pub kind: DomainKind,
    pub precision: u32,
    pub scale: u8,
    pub class: Option<ClassId>,
    pub elements: Vec<Domain>,
}

impl Domain {
    pub fn new(kind: DomainKind) -> Self {
        Domain {
            kind,
            precision: kind.default_precision(),
            scale: 0,
            class: None,
            elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn numeric(precision: u32, scale: u8) -> Self {
        Domain {
            scale,
            ..Domain::new(DomainKind::Numeric).with_precision(precision)
        }
    }

    pub fn char(precision: u32) -> Self {
        Domain::new(DomainKind::Char).with_precision(precision)
    }

    pub fn varchar(precision: u32) -> Self {
        Domain::new(DomainKind::VarChar).with_precision(precision)
    }

    pub fn bit(precision: u32) -> Self {
        Domain::new(DomainKind::Bit).with_precision(precision)
    }

    pub fn varbit(precision: u32) -> Self {
        Domain::new(DomainKind::VarBit).with_precision(precision)
    }

    /// Object domain restricted to `class`, or unrestricted when `None`.
    pub fn object(class: Option<ClassId>) -> Self {
        Domain {
            class,
            ..Domain::new(DomainKind::Object)
        }
    }

    pub fn collection(kind: CollectionKind, elements: Vec<Domain>) -> Self {
        Domain {
            elements,
            ..Domain::new(kind.domain_kind())
        }
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DomainKind::Numeric => write!(f, "NUMERIC({},{})", self.precision, self.scale),
            DomainKind::Char
            | DomainKind::VarChar
            | DomainKind::NChar
            | DomainKind::VarNChar
            | DomainKind::Bit
            | DomainKind::VarBit => write!(f, "{}({})", self.kind, self.precision),
            _ => f.write_str(self.kind.name()),
        }
    }
}

/// Declared domain of an attribute: a primary domain followed by any
/// alternatives (object attributes may accept several classes).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DomainList(SmallVec<[Domain; 1]>);

impl DomainList {
    pub fn single(domain: Domain) -> Self {
        DomainList(smallvec::smallvec![domain])
    }

    /// Build from alternatives. Returns `None` when `domains` is empty.
    pub fn from_alternatives(domains: Vec<Domain>) -> Option<Self> {
        if domains.is_empty() {
            None
        } else {
            Some(DomainList(SmallVec::from_vec(domains)))
        }
    }

    /// The domain that drives setter selection.
    #[inline]
    pub fn primary(&self) -> &Domain {
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Domain> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Domain] {
        &self.0
    }

    /// First alternative that is a collection domain.
    pub fn collection_domain(&self) -> Option<&Domain> {
        self.0.iter().find(|d| d.is_collection())
    }
}

impl From<Domain> for DomainList {
    fn from(domain: Domain) -> Self {
        DomainList::single(domain)
    }
}
