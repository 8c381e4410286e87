//! Schedule documents: weekly recurring intervals, date exceptions and bookings.
//!
//! These mirror the shapes stored on cleaner and booking documents. Clock
//! bounds stay as the `"HH:MM"` strings they arrive as; exception matching
//! compares those strings verbatim, so they are only parsed when minutes are
//! needed.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::{self, WEEKDAY_NAMES};
use crate::error::Result;

/// A wall-clock interval on an unspecified day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: String,
    pub end: String,
}

impl Interval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both bounds into minutes since midnight.
    ///
    /// `field` is the path prefix used in errors, e.g. `schedule.monday[0]`.
    pub fn bounds(&self, field: &str) -> Result<(u32, u32)> {
        let start = clock::parse_clock(&format!("{field}.start"), &self.start)?;
        let end = clock::parse_clock(&format!("{field}.end"), &self.end)?;
        Ok((start, end))
    }
}

/// Recurring availability keyed by lowercase weekday name.
///
/// A weekday with no entry has no availability. Keys outside the seven
/// canonical names are kept but never looked up.
///
/// Deserialised keys are trimmed and lowercased, so `"Monday"` and
/// `"monday"` name the same day. When two keys collapse onto one day their
/// intervals are concatenated in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<String, Vec<Interval>>,
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ScheduleVisitor)
    }
}

struct ScheduleVisitor;

impl<'de> Visitor<'de> for ScheduleVisitor {
    type Value = WeeklySchedule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from weekday name to a list of intervals")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut days: BTreeMap<String, Vec<Interval>> = BTreeMap::new();
        while let Some((key, intervals)) = map.next_entry::<String, Vec<Interval>>()? {
            days.entry(key.trim().to_ascii_lowercase())
                .or_default()
                .extend(intervals);
        }
        Ok(WeeklySchedule { days })
    }
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`WeeklySchedule::insert`].
    pub fn with_day(mut self, weekday: &str, intervals: Vec<Interval>) -> Self {
        self.insert(weekday, intervals);
        self
    }

    /// Replace the intervals for `weekday` (case-insensitive).
    pub fn insert(&mut self, weekday: &str, intervals: Vec<Interval>) {
        self.days.insert(weekday.trim().to_ascii_lowercase(), intervals);
    }

    /// Intervals for a lowercase weekday name, in declared order.
    pub fn intervals_for(&self, weekday: &str) -> &[Interval] {
        self.days.get(weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when no canonical weekday has any interval.
    pub fn is_empty(&self) -> bool {
        WEEKDAY_NAMES
            .iter()
            .all(|day| self.intervals_for(day).is_empty())
    }
}

/// A single declared interval switched off on one date.
///
/// Only an exact `(date, start, end)` match against a schedule interval has
/// any effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exception {
    pub date: String,
    pub start: String,
    pub end: String,
}

impl Exception {
    pub fn new(date: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether this exception cancels `interval` on the day `day_key`.
    pub fn cancels(&self, day_key: &str, interval: &Interval) -> bool {
        self.date == day_key && self.start == interval.start && self.end == interval.end
    }

    pub(crate) fn validate(&self, idx: usize) -> Result<()> {
        clock::parse_date(&format!("exceptions[{idx}].date"), &self.date)?;
        clock::parse_clock(&format!("exceptions[{idx}].start"), &self.start)?;
        clock::parse_clock(&format!("exceptions[{idx}].end"), &self.end)?;
        Ok(())
    }
}

/// An existing reservation. Every booking blocks its interval regardless of
/// `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub cleaner_id: String,
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Booking {
    pub fn new(
        cleaner_id: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            cleaner_id: cleaner_id.into(),
            date: date.into(),
            start: start.into(),
            end: end.into(),
            status: None,
        }
    }
}
