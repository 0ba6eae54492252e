//! Calendar-validating parsers for date and time literals.
//!
//! Accepted shapes:
//! - date: `MM/DD/YYYY` or `YYYY-MM-DD`
//! - time: `HH:MI[:SS]` in 24-hour form, or 12-hour form with `AM`/`PM`
//! - timestamp: a date and a time in either order, whole seconds, between
//!   1970-01-01 00:00:00 and 2038-01-19 03:14:07
//! - datetime: like timestamp, with optional milliseconds and no range limit
//!
//! Zoned literals end with `Z`, `UTC`, `GMT` or a `+HH:MM`/`-HH:MM` offset.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use ldb_diagnostic::{LoadError, LoadErrorKind, LoadResult};
use ldb_ir::{DomainKind, Zone};

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];
const FRACTIONAL_TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%I:%M:%S%.f %p"];

fn conversion_error(text: &str, target: DomainKind) -> LoadError {
    LoadErrorKind::DateConversion {
        value: text.to_owned(),
        target: target.name(),
    }
    .into()
}

fn date_part(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn time_part(text: &str, fractional: bool) -> Option<NaiveTime> {
    let fractions: &[&str] = if fractional {
        &FRACTIONAL_TIME_FORMATS
    } else {
        &[]
    };
    fractions
        .iter()
        .chain(TIME_FORMATS.iter())
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

/// Split a date-and-time literal into its date and the remaining time text.
fn date_and_time(text: &str) -> Option<(NaiveDate, String)> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let (index, date) = words
        .iter()
        .enumerate()
        .find_map(|(i, word)| date_part(word).map(|d| (i, d)))?;
    let time = words
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, word)| *word)
        .collect::<Vec<_>>()
        .join(" ");
    Some((date, time))
}

pub fn parse_date(text: &str) -> LoadResult<NaiveDate> {
    date_part(text.trim()).ok_or_else(|| conversion_error(text, DomainKind::Date))
}

pub fn parse_time(text: &str) -> LoadResult<NaiveTime> {
    time_part(text.trim(), false).ok_or_else(|| conversion_error(text, DomainKind::Time))
}

fn parse_date_time(text: &str, fractional: bool, target: DomainKind) -> LoadResult<NaiveDateTime> {
    let (date, time) = date_and_time(text).ok_or_else(|| conversion_error(text, target))?;
    let time = if time.is_empty() {
        NaiveTime::MIN
    } else {
        time_part(&time, fractional).ok_or_else(|| conversion_error(text, target))?
    };
    Ok(date.and_time(time))
}

/// Earliest and latest representable timestamps.
fn timestamp_range() -> Option<(NaiveDateTime, NaiveDateTime)> {
    let min = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let max = NaiveDate::from_ymd_opt(2038, 1, 19)?.and_hms_opt(3, 14, 7)?;
    Some((min, max))
}

/// Reject timestamps outside the 32-bit epoch range.
pub fn check_timestamp_range(value: NaiveDateTime) -> LoadResult<NaiveDateTime> {
    match timestamp_range() {
        Some((min, max)) if value >= min && value <= max => Ok(value),
        _ => Err(LoadError::overflow(value.to_string(), DomainKind::Timestamp)),
    }
}

pub fn parse_timestamp(text: &str) -> LoadResult<NaiveDateTime> {
    check_timestamp_range(parse_date_time(text, false, DomainKind::Timestamp)?)
}

pub fn parse_datetime(text: &str) -> LoadResult<NaiveDateTime> {
    parse_date_time(text, true, DomainKind::DateTime).map(truncate_to_millis)
}

/// DATETIME keeps millisecond precision.
pub fn truncate_to_millis(value: NaiveDateTime) -> NaiveDateTime {
    let nanos = value.nanosecond() / 1_000_000 * 1_000_000;
    value.with_nanosecond(nanos).unwrap_or(value)
}

fn parse_offset(word: &str) -> Option<FixedOffset> {
    if matches!(word.to_ascii_uppercase().as_str(), "Z" | "UTC" | "GMT") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match word.as_bytes().first()? {
        b'+' => (1, &word[1..]),
        b'-' => (-1, &word[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = rest.split_once(':').unwrap_or_else(|| rest.split_at(rest.len().min(2)));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = if minutes.is_empty() { 0 } else { minutes.parse().ok()? };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Split a trailing zone off a zoned literal.
///
/// Returns the literal without the zone and the zone, or `None` when the
/// literal carries no zone.
pub fn split_zone(text: &str) -> (&str, Option<Zone>) {
    let text = text.trim();
    match text.rsplit_once(char::is_whitespace) {
        Some((body, word)) => match parse_offset(word) {
            Some(offset) => (body.trim_end(), Some(Zone::Offset(offset))),
            None => (text, None),
        },
        None => (text, None),
    }
}

#[cfg(test)]
mod tests;
