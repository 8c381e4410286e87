//! Fixed-size slot grids for displaying a day's raw availability.
//!
//! Bookings are not consulted here; the grid shows what the schedule offers,
//! not what is still free.

use chrono::NaiveDate;

use crate::clock;
use crate::error::{AvailabilityError, Result};
use crate::exceptions::filter_exceptions;
use crate::schedule::{Exception, Interval, WeeklySchedule};

/// Grid step used when callers do not pick one.
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// Split `[start, end]` into consecutive `interval_minutes`-long slots.
///
/// A slot is emitted only if it ends at or before `end`; any remainder
/// shorter than `interval_minutes` is dropped.
///
/// # Errors
/// Returns `AvailabilityError::MalformedClock` for unparseable bounds and
/// `AvailabilityError::InvalidStep` when `interval_minutes` is zero.
pub fn generate_slots(start: &str, end: &str, interval_minutes: u32) -> Result<Vec<Interval>> {
    if interval_minutes == 0 {
        return Err(AvailabilityError::InvalidStep(interval_minutes));
    }
    let start = clock::parse_clock("start", start)?;
    let end = clock::parse_clock("end", end)?;

    let mut slots = Vec::new();
    let mut cursor = start;
    while cursor + interval_minutes <= end {
        let next = cursor + interval_minutes;
        slots.push(Interval::new(
            clock::minutes_to_time(cursor),
            clock::minutes_to_time(next),
        ));
        cursor = next;
    }

    Ok(slots)
}

/// The display grid for one calendar date.
///
/// Takes the weekday's intervals, drops those cancelled by an exception on
/// `date`, and decomposes each survivor with [`generate_slots`].
pub fn day_grid(
    schedule: &WeeklySchedule,
    exceptions: &[Exception],
    date: NaiveDate,
    interval_minutes: u32,
) -> Result<Vec<Interval>> {
    let weekday = clock::weekday_name(date);
    let day_key = clock::date_key(date);

    let mut grid = Vec::new();
    for interval in filter_exceptions(schedule.intervals_for(weekday), exceptions, &day_key) {
        grid.extend(generate_slots(
            &interval.start,
            &interval.end,
            interval_minutes,
        )?);
    }
    Ok(grid)
}
