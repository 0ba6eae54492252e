//! Typed values produced by the conversion matrix.

mod bits;
mod numeric;

use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::CollectionKind;
use crate::{ClassId, ObjectId};

pub use bits::BitString;
pub use numeric::{Numeric, NumericError};

/// Currency of a monetary amount.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Currency {
    #[default]
    Dollar,
    Won,
    Yen,
    Euro,
    Pound,
}

impl Currency {
    /// Split a leading currency symbol off a monetary literal.
    ///
    /// Returns the currency and the remaining amount text; literals without
    /// a symbol are dollars.
    pub fn split_prefix(text: &str) -> (Currency, &str) {
        const PREFIXES: [(&str, Currency); 6] = [
            ("$", Currency::Dollar),
            ("\\", Currency::Won),
            ("\u{20a9}", Currency::Won),
            ("\u{a5}", Currency::Yen),
            ("\u{20ac}", Currency::Euro),
            ("\u{a3}", Currency::Pound),
        ];
        PREFIXES
            .iter()
            .find_map(|(symbol, currency)| text.strip_prefix(symbol).map(|rest| (*currency, rest)))
            .unwrap_or((Currency::Dollar, text))
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Dollar => "$",
            Currency::Won => "\u{20a9}",
            Currency::Yen => "\u{a5}",
            Currency::Euro => "\u{20ac}",
            Currency::Pound => "\u{a3}",
        }
    }
}

/// A monetary amount.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Monetary {
    pub amount: f64,
    pub currency: Currency,
}

/// Time zone carried by zoned temporal values.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Zone {
    Offset(FixedOffset),
    /// Session-local zone, resolved by the store.
    Local,
}

/// A collection under construction or assigned to an attribute.
#[derive(Clone, PartialEq, Debug)]
pub struct CollectionValue {
    kind: CollectionKind,
    elements: Vec<TypedValue>,
}

impl CollectionValue {
    pub fn new(kind: CollectionKind) -> Self {
        CollectionValue {
            kind,
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[TypedValue] {
        &self.elements
    }

    /// Append an element. Sets drop duplicates; returns whether the element
    /// was kept.
    pub fn push(&mut self, value: TypedValue) -> bool {
        if self.kind == CollectionKind::Set && self.elements.contains(&value) {
            return false;
        }
        self.elements.push(value);
        true
    }

    pub fn into_elements(self) -> Vec<TypedValue> {
        self.elements
    }
}

/// A value converted to its in-memory representation.
#[derive(Clone, PartialEq, Debug)]
pub enum TypedValue {
    Null,
    Short(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Numeric(Numeric),
    Monetary(Monetary),
    Char(String),
    VarChar(String),
    NChar(String),
    VarNChar(String),
    Bit(BitString),
    VarBit(BitString),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    DateTime(NaiveDateTime),
    TimeTz(NaiveTime, Zone),
    TimestampTz(NaiveDateTime, Zone),
    DateTimeTz(NaiveDateTime, Zone),
    /// Reference to an instance through its workspace handle.
    Object(ObjectId),
    /// Reference to a class object.
    ClassObject(ClassId),
    Collection(CollectionValue),
}

impl TypedValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Null => "NULL",
            TypedValue::Short(_) => "SHORT",
            TypedValue::Int(_) => "INTEGER",
            TypedValue::BigInt(_) => "BIGINT",
            TypedValue::Float(_) => "FLOAT",
            TypedValue::Double(_) => "DOUBLE",
            TypedValue::Numeric(_) => "NUMERIC",
            TypedValue::Monetary(_) => "MONETARY",
            TypedValue::Char(_) => "CHAR",
            TypedValue::VarChar(_) => "VARCHAR",
            TypedValue::NChar(_) => "NCHAR",
            TypedValue::VarNChar(_) => "VARNCHAR",
            TypedValue::Bit(_) => "BIT",
            TypedValue::VarBit(_) => "VARBIT",
            TypedValue::Date(_) => "DATE",
            TypedValue::Time(_) => "TIME",
            TypedValue::Timestamp(_) => "TIMESTAMP",
            TypedValue::DateTime(_) => "DATETIME",
            TypedValue::TimeTz(..) => "TIMETZ",
            TypedValue::TimestampTz(..) => "TIMESTAMPTZ",
            TypedValue::DateTimeTz(..) => "DATETIMETZ",
            TypedValue::Object(_) => "OBJECT",
            TypedValue::ClassObject(_) => "CLASS",
            TypedValue::Collection(c) => c.kind.domain_kind().name(),
        }
    }

    /// The object handle this value refers to, if any.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            TypedValue::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("NULL"),
            TypedValue::Short(v) => write!(f, "{v}"),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::BigInt(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Double(v) => write!(f, "{v}"),
            TypedValue::Numeric(v) => write!(f, "{v}"),
            TypedValue::Monetary(m) => write!(f, "{}{:.2}", m.currency.symbol(), m.amount),
            TypedValue::Char(s)
            | TypedValue::VarChar(s)
            | TypedValue::NChar(s)
            | TypedValue::VarNChar(s) => write!(f, "'{s}'"),
            TypedValue::Bit(b) | TypedValue::VarBit(b) => write!(f, "{b}"),
            TypedValue::Date(d) => write!(f, "{d}"),
            TypedValue::Time(t) => write!(f, "{t}"),
            TypedValue::Timestamp(ts) | TypedValue::DateTime(ts) => write!(f, "{ts}"),
            TypedValue::TimeTz(t, zone) => write!(f, "{t} {}", ZoneDisplay(*zone)),
            TypedValue::TimestampTz(ts, zone) | TypedValue::DateTimeTz(ts, zone) => {
                write!(f, "{ts} {}", ZoneDisplay(*zone))
            }
            TypedValue::Object(handle) => write!(f, "@{}", handle.raw()),
            TypedValue::ClassObject(class) => write!(f, "@class:{}", class.raw()),
            TypedValue::Collection(c) => {
                f.write_str("{")?;
                for (i, element) in c.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("}")
            }
        }
    }
}

struct ZoneDisplay(Zone);

impl fmt::Display for ZoneDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Zone::Offset(offset) => write!(f, "{offset}"),
            Zone::Local => f.write_str("LOCAL"),
        }
    }
}
