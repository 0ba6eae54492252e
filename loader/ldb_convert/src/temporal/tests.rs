#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldb_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn dates_in_both_orders() {
    assert_eq!(parse_date("03/15/2021").unwrap(), date(2021, 3, 15));
    assert_eq!(parse_date("2021-03-15").unwrap(), date(2021, 3, 15));
}

#[test]
fn invalid_calendar_dates_are_rejected() {
    let err = parse_date("02/30/2021").unwrap_err();
    assert_eq!(err.code(), ErrorCode::L1003);
    assert!(parse_date("yesterday").is_err());
}

#[test]
fn times_in_24_and_12_hour_forms() {
    let expected = NaiveTime::from_hms_opt(13, 5, 0).unwrap();
    assert_eq!(parse_time("13:05").unwrap(), expected);
    assert_eq!(parse_time("01:05:00 PM").unwrap(), expected);
    assert_eq!(parse_time("25:00").unwrap_err().code(), ErrorCode::L1003);
}

#[test]
fn timestamp_accepts_either_order() {
    let expected = date(2001, 10, 5).and_hms_opt(9, 30, 0).unwrap();
    assert_eq!(parse_timestamp("10/05/2001 09:30:00").unwrap(), expected);
    assert_eq!(parse_timestamp("09:30:00 AM 10/05/2001").unwrap(), expected);
    assert_eq!(
        parse_timestamp("2001-10-05").unwrap(),
        date(2001, 10, 5).and_hms_opt(0, 0, 0).unwrap()
    );
}

#[test]
fn timestamp_range_is_checked() {
    assert_eq!(parse_timestamp("1969-12-31 23:59:59").unwrap_err().code(), ErrorCode::L1002);
    assert_eq!(parse_timestamp("2038-01-19 03:14:08").unwrap_err().code(), ErrorCode::L1002);
    assert!(parse_timestamp("2038-01-19 03:14:07").is_ok());
}

#[test]
fn datetime_keeps_milliseconds_only() {
    let value = parse_datetime("2021-03-15 10:00:00.123456").unwrap();
    assert_eq!(value.nanosecond(), 123_000_000);
    assert!(parse_datetime("1900-01-01 00:00:00").is_ok());
}

#[test]
fn zones_are_split_off() {
    let (body, zone) = split_zone("10:00:00 +09:00");
    assert_eq!(body, "10:00:00");
    assert_eq!(zone, Some(Zone::Offset(FixedOffset::east_opt(9 * 3600).unwrap())));

    let (body, zone) = split_zone("2021-03-15 10:00 UTC");
    assert_eq!(body, "2021-03-15 10:00");
    assert_eq!(zone, Some(Zone::Offset(FixedOffset::east_opt(0).unwrap())));

    assert_eq!(split_zone("10:00:00 PM"), ("10:00:00 PM", None));
    assert_eq!(split_zone("-0530 01:00").1, None);
}
