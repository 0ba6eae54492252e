//! The conversion matrix: per-domain setter tables indexed by lexical type.
//!
//! A [`SetterTable`] is built once per attribute from its domain. Each slot
//! names the [`SetterOp`] used for tokens of that lexical type, so the hot
//! path is one array lookup followed by a specialised conversion.

use ldb_diagnostic::{LoadError, LoadErrorKind, LoadResult};
use ldb_ir::{Domain, DomainKind, DomainList, LexicalType, ObjectImage, TypedValue};

use crate::coerce::coerce;
use crate::element::convert_element;
use crate::{integer, real, text};

/// How a token of one lexical type is stored into one domain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SetterOp {
    /// The token type cannot be stored in this domain.
    Mismatch,
    /// Store NULL, honouring NOT NULL.
    Null,
    /// Element conversion followed by a domain cast.
    Generic,
    IntToShort,
    IntToInt,
    IntToBigInt,
    RealToFloat,
    RealToDouble,
    /// Character token into a character domain, with pad truncation.
    StrToChars,
    /// Binary or hex token into a bit domain, with zero-bit truncation.
    BitsToBits,
    Monetary,
    /// Instance reference; resolved by the caller.
    ObjectRef,
    /// Class object reference; resolved by the caller.
    ClassObjectRef,
    /// Collection open; built by the caller.
    Collection,
}

impl SetterOp {
    /// Ops whose value the caller produces (references and collections).
    pub fn is_deferred(self) -> bool {
        matches!(
            self,
            SetterOp::ObjectRef | SetterOp::ClassObjectRef | SetterOp::Collection
        )
    }
}

/// Choose the op for `lexical` tokens stored into `kind` attributes.
pub fn select_op(kind: DomainKind, lexical: LexicalType) -> SetterOp {
    use LexicalType as L;

    match (kind, lexical) {
        (_, L::Null) => SetterOp::Null,

        (DomainKind::Short, L::Int) => SetterOp::IntToShort,
        (DomainKind::Integer, L::Int) => SetterOp::IntToInt,
        (DomainKind::BigInt, L::Int) => SetterOp::IntToBigInt,
        (DomainKind::Float, L::Int | L::Numeric | L::Double | L::Float) => SetterOp::RealToFloat,
        (DomainKind::Double, L::Int | L::Numeric | L::Double | L::Float) => SetterOp::RealToDouble,

        (DomainKind::Char | DomainKind::VarChar, L::Str)
        | (DomainKind::NChar | DomainKind::VarNChar, L::NStr) => SetterOp::StrToChars,
        (DomainKind::Bit | DomainKind::VarBit, L::BitStr | L::HexStr) => SetterOp::BitsToBits,
        (DomainKind::Monetary, L::Monetary) => SetterOp::Monetary,

        (DomainKind::Date, L::Str | L::Date)
        | (DomainKind::Time | DomainKind::TimeTz | DomainKind::TimeLtz, L::Str | L::Time | L::TimeTz | L::TimeLtz)
        | (
            DomainKind::Timestamp | DomainKind::TimestampTz | DomainKind::TimestampLtz,
            L::Str | L::Timestamp | L::TimestampTz | L::TimestampLtz,
        )
        | (
            DomainKind::DateTime | DomainKind::DateTimeTz | DomainKind::DateTimeLtz,
            L::Str | L::DateTime | L::DateTimeTz | L::DateTimeLtz,
        ) => SetterOp::Generic,

        (DomainKind::Object, L::Oid) => SetterOp::ObjectRef,
        (DomainKind::Object, L::ClassOid) => SetterOp::ClassObjectRef,
        (DomainKind::Set | DomainKind::Multiset | DomainKind::Sequence, L::Collection) => {
            SetterOp::Collection
        }

        // Any domain takes numeric tokens through the generic cast.
        (_, L::Int | L::Numeric | L::Double | L::Float) => SetterOp::Generic,
        _ => SetterOp::Mismatch,
    }
}

/// Setter ops for every lexical type, built once from a domain.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetterTable {
    ops: [SetterOp; LexicalType::COUNT],
}

impl SetterTable {
    pub fn for_domain(domain: &Domain) -> Self {
        SetterTable {
            ops: LexicalType::ALL.map(|lexical| select_op(domain.kind, lexical)),
        }
    }

    #[inline]
    pub fn op(&self, lexical: LexicalType) -> SetterOp {
        self.ops[lexical.index()]
    }
}

/// Where a converted value goes.
#[derive(Copy, Clone, Debug)]
pub struct AttrTarget<'a> {
    pub domains: &'a DomainList,
    pub slot: usize,
    pub not_null: bool,
}

/// What [`set_direct`] did with a token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SetOutcome {
    Written,
    /// The token is an instance reference the caller must resolve.
    Reference,
    /// The token is a class object reference the caller must resolve.
    ClassReference,
    /// The token opens a collection the caller must build.
    Collection,
}

/// Produce the value an op stores, for ops that need nothing but the token.
pub fn value_for(
    op: SetterOp,
    token: &str,
    lexical: LexicalType,
    domain: &Domain,
) -> LoadResult<TypedValue> {
    match op {
        SetterOp::Null => Ok(TypedValue::Null),
        SetterOp::IntToShort => integer::to_short(token).map(TypedValue::Short),
        SetterOp::IntToInt => integer::to_int(token).map(TypedValue::Int),
        SetterOp::IntToBigInt => integer::to_bigint(token).map(TypedValue::BigInt),
        SetterOp::RealToFloat => {
            let value = real::parse_double(token)?;
            real::narrow_to_float(value, token).map(TypedValue::Float)
        }
        SetterOp::RealToDouble => real::parse_double(token).map(TypedValue::Double),
        SetterOp::StrToChars => {
            let fitted = text::fit_chars(token, domain)?;
            Ok(match domain.kind {
                DomainKind::Char => TypedValue::Char(fitted),
                DomainKind::NChar => TypedValue::NChar(fitted),
                DomainKind::VarNChar => TypedValue::VarNChar(fitted),
                _ => TypedValue::VarChar(fitted),
            })
        }
        SetterOp::Monetary => real::parse_monetary(token).map(TypedValue::Monetary),
        SetterOp::BitsToBits | SetterOp::Generic => coerce(convert_element(token, lexical)?, domain),
        SetterOp::Mismatch
        | SetterOp::ObjectRef
        | SetterOp::ClassObjectRef
        | SetterOp::Collection => Err(LoadError::domain_conflict(lexical, domain)),
    }
}

/// Convert a scalar token to a value of the attribute's primary domain.
///
/// References and collections need the resolver or the collection builder
/// and are reported as a domain conflict here.
pub fn convert(token: &str, lexical: LexicalType, domains: &DomainList) -> LoadResult<TypedValue> {
    let domain = domains.primary();
    value_for(select_op(domain.kind, lexical), token, lexical, domain)
}

/// Store a token straight into an instance image.
///
/// Fixed-width slots get their bound flag set; NULL and variable-width
/// values leave it clear.
pub fn set_direct(
    table: &SetterTable,
    token: &str,
    lexical: LexicalType,
    target: &AttrTarget<'_>,
    image: &mut ObjectImage,
) -> LoadResult<SetOutcome> {
    let op = table.op(lexical);
    match op {
        SetterOp::ObjectRef => return Ok(SetOutcome::Reference),
        SetterOp::ClassObjectRef => return Ok(SetOutcome::ClassReference),
        SetterOp::Collection => return Ok(SetOutcome::Collection),
        SetterOp::Null if target.not_null => return Err(LoadErrorKind::NullNotAllowed.into()),
        _ => {}
    }
    let domain = target.domains.primary();
    let value = value_for(op, token, lexical, domain)?;
    store(image, target, value);
    Ok(SetOutcome::Written)
}

/// Store an already converted value, applying the NOT NULL and bound-flag
/// rules of [`set_direct`].
pub fn store_value(
    image: &mut ObjectImage,
    target: &AttrTarget<'_>,
    value: TypedValue,
) -> LoadResult<()> {
    if value.is_null() && target.not_null {
        return Err(LoadErrorKind::NullNotAllowed.into());
    }
    store(image, target, value);
    Ok(())
}

fn store(image: &mut ObjectImage, target: &AttrTarget<'_>, value: TypedValue) {
    let fixed = !value.is_null() && target.domains.primary().kind.is_fixed_width();
    image.set(target.slot, value, fixed);
}

#[cfg(test)]
mod tests;
