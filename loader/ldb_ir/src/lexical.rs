//! Lexical type tags attached to every value token by the tokenizer.

use std::fmt;

/// Lexical class of a value token.
///
/// The tag says how the token was written in the load file, not what the
/// target attribute is. Setter tables are indexed by this tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum LexicalType {
    Null,
    Int,
    Float,
    Double,
    Numeric,
    Str,
    NStr,
    BitStr,
    HexStr,
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
    Monetary,
    /// `@Class|ordinal` instance reference.
    Oid,
    /// `@Class` reference to the class object itself.
    ClassOid,
    /// Collection brace; opening and closing are separate events.
    Collection,
}

impl LexicalType {
    /// Number of lexical types; the length of every setter table.
    pub const COUNT: usize = 23;

    /// All lexical types in table order.
    pub const ALL: [LexicalType; Self::COUNT] = [
        LexicalType::Null,
        LexicalType::Int,
        LexicalType::Float,
        LexicalType::Double,
        LexicalType::Numeric,
        LexicalType::Str,
        LexicalType::NStr,
        LexicalType::BitStr,
        LexicalType::HexStr,
        LexicalType::Date,
        LexicalType::Time,
        LexicalType::TimeTz,
        LexicalType::TimeLtz,
        LexicalType::Timestamp,
        LexicalType::TimestampTz,
        LexicalType::TimestampLtz,
        LexicalType::DateTime,
        LexicalType::DateTimeTz,
        LexicalType::DateTimeLtz,
        LexicalType::Monetary,
        LexicalType::Oid,
        LexicalType::ClassOid,
        LexicalType::Collection,
    ];

    /// Index into a setter table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Date, time, timestamp and datetime tokens, zoned or not.
    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            LexicalType::Date
                | LexicalType::Time
                | LexicalType::TimeTz
                | LexicalType::TimeLtz
                | LexicalType::Timestamp
                | LexicalType::TimestampTz
                | LexicalType::TimestampLtz
                | LexicalType::DateTime
                | LexicalType::DateTimeTz
                | LexicalType::DateTimeLtz
        )
    }

    /// Object and class-object references.
    pub const fn is_reference(self) -> bool {
        matches!(self, LexicalType::Oid | LexicalType::ClassOid)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LexicalType::Null => "null",
            LexicalType::Int => "integer",
            LexicalType::Float => "float",
            LexicalType::Double => "double",
            LexicalType::Numeric => "numeric",
            LexicalType::Str => "string",
            LexicalType::NStr => "nstring",
            LexicalType::BitStr => "bit string",
            LexicalType::HexStr => "hex string",
            LexicalType::Date => "date",
            LexicalType::Time => "time",
            LexicalType::TimeTz => "timetz",
            LexicalType::TimeLtz => "timeltz",
            LexicalType::Timestamp => "timestamp",
            LexicalType::TimestampTz => "timestamptz",
            LexicalType::TimestampLtz => "timestampltz",
            LexicalType::DateTime => "datetime",
            LexicalType::DateTimeTz => "datetimetz",
            LexicalType::DateTimeLtz => "datetimeltz",
            LexicalType::Monetary => "monetary",
            LexicalType::Oid => "object reference",
            LexicalType::ClassOid => "class reference",
            LexicalType::Collection => "collection",
        }
    }
}

impl fmt::Display for LexicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_discriminants() {
        for (i, ty) in LexicalType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), i, "{ty} is out of order");
        }
    }

    #[test]
    fn temporal_and_reference_classes() {
        assert!(LexicalType::TimestampLtz.is_temporal());
        assert!(!LexicalType::Str.is_temporal());
        assert!(LexicalType::ClassOid.is_reference());
        assert!(!LexicalType::Collection.is_reference());
    }
}
