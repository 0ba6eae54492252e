//! Domain coercion: a typed value cast to an attribute's declared domain.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use ldb_diagnostic::{LoadError, LoadResult};
use ldb_ir::{CollectionValue, Currency, Domain, DomainKind, Monetary, Numeric, TypedValue, Zone};

use crate::integer::classify;
use crate::text::{fit_bits, fit_chars};
use crate::{real, temporal};

/// Cast `value` to `domain`.
///
/// Numeric casts check the target range and report `Overflow`; casts with
/// no sensible meaning report `DomainConflict`. NULL casts to anything.
pub fn coerce(value: TypedValue, domain: &Domain) -> LoadResult<TypedValue> {
    if value.is_null() {
        return Ok(TypedValue::Null);
    }
    match domain.kind {
        DomainKind::Short => {
            let n = to_integer(&value, domain)?;
            i16::try_from(n)
                .map(TypedValue::Short)
                .map_err(|_| LoadError::overflow(value.to_string(), domain))
        }
        DomainKind::Integer => {
            let n = to_integer(&value, domain)?;
            i32::try_from(n)
                .map(TypedValue::Int)
                .map_err(|_| LoadError::overflow(value.to_string(), domain))
        }
        DomainKind::BigInt => {
            let n = to_integer(&value, domain)?;
            i64::try_from(n)
                .map(TypedValue::BigInt)
                .map_err(|_| LoadError::overflow(value.to_string(), domain))
        }
        DomainKind::Float => {
            let v = to_double(&value, domain)?;
            real::narrow_to_float(v, &value.to_string()).map(TypedValue::Float)
        }
        DomainKind::Double => to_double(&value, domain).map(TypedValue::Double),
        DomainKind::Numeric => {
            let n = to_numeric(&value, domain)?;
            n.fit(domain.precision, domain.scale)
                .map(TypedValue::Numeric)
                .ok_or_else(|| LoadError::overflow(value.to_string(), domain))
        }
        DomainKind::Monetary => match value {
            TypedValue::Monetary(m) => Ok(TypedValue::Monetary(m)),
            TypedValue::Char(s) | TypedValue::VarChar(s) => {
                real::parse_monetary(&s).map(TypedValue::Monetary)
            }
            other => to_double(&other, domain).map(|amount| {
                TypedValue::Monetary(Monetary {
                    amount,
                    currency: Currency::default(),
                })
            }),
        },
        DomainKind::Char | DomainKind::VarChar | DomainKind::NChar | DomainKind::VarNChar => {
            let text = to_text(value, domain)?;
            let text = fit_chars(&text, domain)?;
            Ok(match domain.kind {
                DomainKind::Char => TypedValue::Char(text),
                DomainKind::NChar => TypedValue::NChar(text),
                DomainKind::VarNChar => TypedValue::VarNChar(text),
                _ => TypedValue::VarChar(text),
            })
        }
        DomainKind::Bit | DomainKind::VarBit => match value {
            TypedValue::Bit(bits) | TypedValue::VarBit(bits) => {
                let bits = fit_bits(&bits, domain)?;
                Ok(if domain.kind == DomainKind::Bit {
                    TypedValue::Bit(bits)
                } else {
                    TypedValue::VarBit(bits)
                })
            }
            other => Err(conflict(&other, domain)),
        },
        DomainKind::Date => match value {
            TypedValue::Date(d) => Ok(TypedValue::Date(d)),
            TypedValue::Timestamp(ts)
            | TypedValue::DateTime(ts)
            | TypedValue::TimestampTz(ts, _)
            | TypedValue::DateTimeTz(ts, _) => Ok(TypedValue::Date(ts.date())),
            TypedValue::Char(s) | TypedValue::VarChar(s) => {
                temporal::parse_date(&s).map(TypedValue::Date)
            }
            other => Err(conflict(&other, domain)),
        },
        DomainKind::Time => to_time(value, domain).map(|(t, _)| TypedValue::Time(t)),
        DomainKind::TimeTz | DomainKind::TimeLtz => {
            let (t, zone) = to_time(value, domain)?;
            Ok(TypedValue::TimeTz(t, zone_for(domain.kind, zone)))
        }
        DomainKind::Timestamp => {
            let (ts, _) = to_date_time(value, domain, temporal::parse_timestamp)?;
            temporal::check_timestamp_range(whole_seconds(ts)).map(TypedValue::Timestamp)
        }
        DomainKind::TimestampTz | DomainKind::TimestampLtz => {
            let (ts, zone) = to_date_time(value, domain, temporal::parse_timestamp)?;
            let ts = temporal::check_timestamp_range(whole_seconds(ts))?;
            Ok(TypedValue::TimestampTz(ts, zone_for(domain.kind, zone)))
        }
        DomainKind::DateTime => {
            let (ts, _) = to_date_time(value, domain, temporal::parse_datetime)?;
            Ok(TypedValue::DateTime(temporal::truncate_to_millis(ts)))
        }
        DomainKind::DateTimeTz | DomainKind::DateTimeLtz => {
            let (ts, zone) = to_date_time(value, domain, temporal::parse_datetime)?;
            Ok(TypedValue::DateTimeTz(
                temporal::truncate_to_millis(ts),
                zone_for(domain.kind, zone),
            ))
        }
        DomainKind::Object => match value {
            reference @ (TypedValue::Object(_) | TypedValue::ClassObject(_)) => Ok(reference),
            other => Err(conflict(&other, domain)),
        },
        DomainKind::Set | DomainKind::Multiset | DomainKind::Sequence => match value {
            TypedValue::Collection(collection) => {
                coerce_collection(collection, domain).map(TypedValue::Collection)
            }
            other => Err(conflict(&other, domain)),
        },
    }
}

/// Cast every element to the collection's element domain and rebuild the
/// collection with the domain's kind (so a set drops duplicates).
///
/// Each element takes the first element domain that accepts it; an empty
/// element domain list accepts anything.
pub fn coerce_collection(
    collection: CollectionValue,
    domain: &Domain,
) -> LoadResult<CollectionValue> {
    let kind = domain.kind.collection_kind().unwrap_or(collection.kind());
    let mut out = CollectionValue::new(kind);
    for element in collection.into_elements() {
        out.push(coerce_element(element, &domain.elements)?);
    }
    Ok(out)
}

fn coerce_element(element: TypedValue, domains: &[Domain]) -> LoadResult<TypedValue> {
    let mut first_error = None;
    for domain in domains {
        match coerce(element.clone(), domain) {
            Ok(value) => return Ok(value),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(element),
    }
}

fn conflict(value: &TypedValue, domain: &Domain) -> LoadError {
    LoadError::domain_conflict(value.type_name(), domain)
}

fn zone_for(kind: DomainKind, zone: Option<Zone>) -> Zone {
    match kind {
        DomainKind::TimeLtz | DomainKind::TimestampLtz | DomainKind::DateTimeLtz => Zone::Local,
        _ => zone.unwrap_or(Zone::Local),
    }
}

fn whole_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn to_integer(value: &TypedValue, domain: &Domain) -> LoadResult<i128> {
    let overflow = || LoadError::overflow(value.to_string(), domain);
    match value {
        TypedValue::Short(v) => Ok(i128::from(*v)),
        TypedValue::Int(v) => Ok(i128::from(*v)),
        TypedValue::BigInt(v) => Ok(i128::from(*v)),
        TypedValue::Numeric(n) => n.round_to_integer().ok_or_else(overflow),
        TypedValue::Float(v) => round_double(f64::from(*v)).ok_or_else(overflow),
        TypedValue::Double(v) => round_double(*v).ok_or_else(overflow),
        TypedValue::Monetary(m) => round_double(m.amount).ok_or_else(overflow),
        TypedValue::Char(s) | TypedValue::VarChar(s) => classify(s)?.to_i128().ok_or_else(overflow),
        other => Err(conflict(other, domain)),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "magnitude is checked against the i64 range first"
)]
fn round_double(v: f64) -> Option<i128> {
    let rounded = v.round();
    // Anything past the i64 range overflows every integer domain anyway.
    let limit = i64::MAX as f64;
    (rounded.is_finite() && rounded.abs() <= limit).then_some(rounded as i128)
}

#[allow(clippy::cast_precision_loss, reason = "BIGINT to DOUBLE is lossy by definition")]
fn to_double(value: &TypedValue, domain: &Domain) -> LoadResult<f64> {
    match value {
        TypedValue::Short(v) => Ok(f64::from(*v)),
        TypedValue::Int(v) => Ok(f64::from(*v)),
        TypedValue::BigInt(v) => Ok(*v as f64),
        TypedValue::Numeric(n) => Ok(n.to_f64()),
        TypedValue::Float(v) => Ok(f64::from(*v)),
        TypedValue::Double(v) => Ok(*v),
        TypedValue::Monetary(m) => Ok(m.amount),
        TypedValue::Char(s) | TypedValue::VarChar(s) => real::parse_double(s),
        other => Err(conflict(other, domain)),
    }
}

fn to_numeric(value: &TypedValue, domain: &Domain) -> LoadResult<Numeric> {
    let overflow = || LoadError::overflow(value.to_string(), domain);
    match value {
        TypedValue::Short(v) => Ok(Numeric::from_i64(i64::from(*v))),
        TypedValue::Int(v) => Ok(Numeric::from_i64(i64::from(*v))),
        TypedValue::BigInt(v) => Ok(Numeric::from_i64(*v)),
        TypedValue::Numeric(n) => Ok(*n),
        TypedValue::Float(v) => Numeric::from_f64(f64::from(*v), domain.scale).ok_or_else(overflow),
        TypedValue::Double(v) => Numeric::from_f64(*v, domain.scale).ok_or_else(overflow),
        TypedValue::Monetary(m) => Numeric::from_f64(m.amount, domain.scale).ok_or_else(overflow),
        TypedValue::Char(s) | TypedValue::VarChar(s) => Numeric::parse(s).map_err(|_| overflow()),
        other => Err(conflict(other, domain)),
    }
}

fn to_text(value: TypedValue, domain: &Domain) -> LoadResult<String> {
    match value {
        TypedValue::Char(s)
        | TypedValue::VarChar(s)
        | TypedValue::NChar(s)
        | TypedValue::VarNChar(s) => Ok(s),
        other @ (TypedValue::Object(_)
        | TypedValue::ClassObject(_)
        | TypedValue::Collection(_)
        | TypedValue::Bit(_)
        | TypedValue::VarBit(_)) => Err(conflict(&other, domain)),
        TypedValue::Monetary(m) => Ok(format!("{:.2}", m.amount)),
        other => Ok(other.to_string()),
    }
}

fn to_time(value: TypedValue, domain: &Domain) -> LoadResult<(NaiveTime, Option<Zone>)> {
    match value {
        TypedValue::Time(t) => Ok((t, None)),
        TypedValue::TimeTz(t, zone) => Ok((t, Some(zone))),
        TypedValue::Timestamp(ts) | TypedValue::DateTime(ts) => Ok((ts.time(), None)),
        TypedValue::TimestampTz(ts, zone) | TypedValue::DateTimeTz(ts, zone) => {
            Ok((ts.time(), Some(zone)))
        }
        TypedValue::Char(s) | TypedValue::VarChar(s) => {
            let (body, zone) = temporal::split_zone(&s);
            Ok((temporal::parse_time(body)?, zone))
        }
        other => Err(conflict(&other, domain)),
    }
}

fn to_date_time(
    value: TypedValue,
    domain: &Domain,
    parse: fn(&str) -> LoadResult<NaiveDateTime>,
) -> LoadResult<(NaiveDateTime, Option<Zone>)> {
    match value {
        TypedValue::Timestamp(ts) | TypedValue::DateTime(ts) => Ok((ts, None)),
        TypedValue::TimestampTz(ts, zone) | TypedValue::DateTimeTz(ts, zone) => {
            Ok((ts, Some(zone)))
        }
        TypedValue::Date(d) => Ok((d.and_time(NaiveTime::MIN), None)),
        TypedValue::Char(s) | TypedValue::VarChar(s) => {
            let (body, zone) = temporal::split_zone(&s);
            Ok((parse(body)?, zone))
        }
        other => Err(conflict(&other, domain)),
    }
}

#[cfg(test)]
mod tests;
