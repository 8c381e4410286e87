//! Find the earliest free slot of a requested duration.
//!
//! Days are scanned in ascending order from the UTC date of `now`, up to a
//! fixed horizon. On each day the weekday's recurring intervals (minus exact
//! exceptions) are probed at a fixed step, and the first candidate that does
//! not overlap a booking (and, on day zero, does not start before `now`) is
//! returned.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::clock;
use crate::conflict::{self, MinuteRange};
use crate::error::{AvailabilityError, Result};
use crate::exceptions::retain_uncancelled;
use crate::schedule::{Booking, Exception, Interval, WeeklySchedule};

/// Number of calendar days scanned, counting today.
pub const HORIZON_DAYS: u32 = 90;

/// Distance between probed candidate starts, independent of the duration.
pub const CANDIDATE_STEP_MINUTES: u32 = 60;

/// Order in which a day's candidates are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrder {
    /// Interval by interval in schedule order, ascending within each
    /// interval. A later-listed interval that starts earlier in the day is
    /// only reached after the earlier-listed ones.
    #[default]
    Declared,
    /// Every candidate of the day in ascending start time.
    Chronological,
}

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub horizon_days: u32,
    pub step_minutes: u32,
    pub order: CandidateOrder,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            horizon_days: HORIZON_DAYS,
            step_minutes: CANDIDATE_STEP_MINUTES,
            order: CandidateOrder::Declared,
        }
    }
}

/// Start of a free slot: a date plus minute of day, in UTC.
///
/// Renders and serialises as `YYYY-MM-DDTHH:MM:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedSlot {
    pub date: NaiveDate,
    pub start_minute: u32,
}

impl ResolvedSlot {
    /// The slot start as a UTC instant.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let midnight = self.date.and_time(chrono::NaiveTime::MIN).and_utc();
        midnight + chrono::Duration::minutes(i64::from(self.start_minute))
    }
}

impl fmt::Display for ResolvedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{}:00Z",
            clock::date_key(self.date),
            clock::minutes_to_time(self.start_minute)
        )
    }
}

impl Serialize for ResolvedSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Convert a duration in hours to whole minutes (`round(hours * 60)`).
///
/// # Errors
/// Returns `AvailabilityError::InvalidDuration` for non-finite or
/// non-positive hours and `AvailabilityError::DurationRoundsToZero` for
/// positive hours shorter than half a minute.
pub fn duration_minutes(hours: f64) -> Result<u32> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(AvailabilityError::InvalidDuration(hours));
    }
    let minutes = (hours * 60.0).round();
    if minutes < 1.0 {
        return Err(AvailabilityError::DurationRoundsToZero(hours));
    }
    Ok(minutes.min(f64::from(u32::MAX)) as u32)
}

/// A declared interval with its bounds already parsed.
#[derive(Debug, Clone, Copy)]
struct PreparedInterval<'a> {
    interval: &'a Interval,
    range: MinuteRange,
}

/// A cleaner's schedule data, validated, with interval bounds parsed and
/// bookings indexed by date.
///
/// Build once and resolve as many durations against it as needed.
#[derive(Debug)]
pub struct PreparedCalendar<'a> {
    /// Indexed by days from Sunday, in declared order.
    weekdays: [Vec<PreparedInterval<'a>>; 7],
    exceptions: &'a [Exception],
    booked: HashMap<String, Vec<MinuteRange>>,
}

impl<'a> PreparedCalendar<'a> {
    /// Validate every clock and date string and index `bookings` by date.
    pub fn new<'b, I>(
        schedule: &'a WeeklySchedule,
        exceptions: &'a [Exception],
        bookings: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'b Booking>,
    {
        let mut weekdays: [Vec<PreparedInterval<'a>>; 7] = Default::default();
        for (day, prepared) in clock::WEEKDAY_NAMES.iter().zip(weekdays.iter_mut()) {
            for (idx, interval) in schedule.intervals_for(day).iter().enumerate() {
                let (start, end) = interval.bounds(&format!("schedule.{day}[{idx}]"))?;
                prepared.push(PreparedInterval {
                    interval,
                    range: MinuteRange::new(start, end),
                });
            }
        }
        for (idx, exception) in exceptions.iter().enumerate() {
            exception.validate(idx)?;
        }
        let booked = conflict::index_bookings(bookings)?;
        Ok(Self {
            weekdays,
            exceptions,
            booked,
        })
    }

    fn intervals_on(&self, day: NaiveDate) -> &[PreparedInterval<'a>] {
        &self.weekdays[day.weekday().num_days_from_sunday() as usize]
    }

    fn booked_on(&self, day_key: &str) -> &[MinuteRange] {
        self.booked.get(day_key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Earliest-slot search with configurable horizon, step and ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Find the earliest free slot of `duration_hours` starting from `now`.
    ///
    /// Returns `Ok(None)` when the horizon is exhausted. Under
    /// [`CandidateOrder::Declared`] "earliest" means earliest day, then first
    /// fitting candidate in schedule order, so a longer duration can resolve
    /// earlier in the day than a shorter one.
    ///
    /// # Errors
    /// Any malformed clock or date string in the inputs, an invalid
    /// duration, or a zero step.
    pub fn resolve(
        &self,
        schedule: &WeeklySchedule,
        exceptions: &[Exception],
        bookings: &[Booking],
        duration_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedSlot>> {
        let calendar = PreparedCalendar::new(schedule, exceptions, bookings)?;
        self.resolve_prepared(&calendar, duration_hours, now)
    }

    /// Same as [`Resolver::resolve`] over an already prepared calendar.
    pub fn resolve_prepared(
        &self,
        calendar: &PreparedCalendar<'_>,
        duration_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedSlot>> {
        let duration_min = duration_minutes(duration_hours)?;
        let step = self.options.step_minutes;
        if step == 0 {
            return Err(AvailabilityError::InvalidStep(step));
        }

        let today = now.date_naive();
        let now_minute = now.hour() * 60 + now.minute();

        for offset in 0..self.options.horizon_days {
            let Some(day) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let day_key = clock::date_key(day);
            let earliest = if offset == 0 { now_minute } else { 0 };

            let day_slots = retain_uncancelled(
                calendar.intervals_on(day),
                |prepared| prepared.interval,
                calendar.exceptions,
                &day_key,
            );
            if day_slots.is_empty() {
                continue;
            }
            let booked = calendar.booked_on(&day_key);

            let mut candidates = Vec::new();
            for prepared in day_slots {
                let MinuteRange { start, end } = prepared.range;
                let Some(last) = end.checked_sub(duration_min) else {
                    continue;
                };
                if last < start {
                    continue;
                }
                candidates.extend((start..=last).step_by(step as usize));
            }
            if self.options.order == CandidateOrder::Chronological {
                candidates.sort_unstable();
            }

            let found = candidates
                .into_iter()
                .find(|&c| c >= earliest && !conflict::overlaps_any(c, duration_min, booked));

            if let Some(start_minute) = found {
                let slot = ResolvedSlot {
                    date: day,
                    start_minute,
                };
                debug!(%slot, duration_min, days_scanned = offset + 1, "found free slot");
                return Ok(Some(slot));
            }
        }

        debug!(
            duration_min,
            horizon_days = self.options.horizon_days,
            "no free slot within horizon"
        );
        Ok(None)
    }
}

/// Earliest free slot using the default 90-day horizon and hourly step.
///
/// Candidates within a day are taken in declared order
/// ([`CandidateOrder::Declared`]), so the result is not monotone in the
/// duration when a day lists a later interval first. With monday
/// `[14:00-15:00, 09:00-13:00]`, one hour resolves to 14:00 and two hours to
/// 09:00. Use a [`Resolver`] with [`CandidateOrder::Chronological`] for the
/// earliest start time of the day.
pub fn find_next_available(
    schedule: &WeeklySchedule,
    exceptions: &[Exception],
    bookings: &[Booking],
    duration_hours: f64,
    now: DateTime<Utc>,
) -> Result<Option<ResolvedSlot>> {
    Resolver::default().resolve(schedule, exceptions, bookings, duration_hours, now)
}

/// [`find_next_available`] measured from the current instant.
pub fn find_next_available_now(
    schedule: &WeeklySchedule,
    exceptions: &[Exception],
    bookings: &[Booking],
    duration_hours: f64,
) -> Result<Option<ResolvedSlot>> {
    find_next_available(schedule, exceptions, bookings, duration_hours, Utc::now())
}
