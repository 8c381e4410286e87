//! Clock-string arithmetic and weekday naming.
//!
//! Schedules, exceptions and bookings all carry wall-clock bounds as `"HH:MM"`
//! strings and dates as `"YYYY-MM-DD"`. Everything downstream works in
//! minutes since midnight, so this module is the single place where those
//! strings are parsed and rendered.

use chrono::{Datelike, NaiveDate};

use crate::error::{AvailabilityError, Result};

/// Minutes in a day. `"24:00"` parses to this value as an end-of-day bound.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Weekday names indexed by days from Sunday (Sunday = 0 … Saturday = 6).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Convert an `"HH:MM"` clock string into minutes since midnight.
///
/// # Errors
/// Returns `AvailabilityError::MalformedClock` if the string is not a valid
/// 24-hour clock time.
pub fn time_to_minutes(clock: &str) -> Result<u32> {
    parse_clock("time", clock)
}

/// Like [`time_to_minutes`], but names `field` in the error.
pub fn parse_clock(field: &str, value: &str) -> Result<u32> {
    let malformed = || AvailabilityError::MalformedClock {
        field: field.to_string(),
        value: value.to_string(),
    };

    let (hours, minutes) = value.split_once(':').ok_or_else(malformed)?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let h: u32 = hours.parse().map_err(|_| malformed())?;
    let m: u32 = minutes.parse().map_err(|_| malformed())?;

    match (h, m) {
        (24, 0) => Ok(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Ok(h * 60 + m),
        _ => Err(malformed()),
    }
}

/// Render minutes since midnight as a zero-padded `"HH:MM"` string.
///
/// Meaningful for `0..=1440`; `1440` renders as `"24:00"`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Lowercase English weekday name for a calendar date.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Parse a `"YYYY-MM-DD"` date, naming `field` in the error.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AvailabilityError::MalformedDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// The `"YYYY-MM-DD"` key used to match exceptions and bookings to a day.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
