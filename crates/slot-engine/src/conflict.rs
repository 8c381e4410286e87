//! Detect overlaps between candidate slots and existing bookings.
//!
//! All ranges are half-open `[start, end)` in minutes since midnight, so a
//! booking that ends exactly when a candidate starts (or starts exactly when
//! it ends) is NOT a conflict.

use std::collections::HashMap;

use crate::clock;
use crate::error::Result;
use crate::schedule::Booking;

/// A half-open range of minutes within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteRange {
    pub start: u32,
    pub end: u32,
}

impl MinuteRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Two ranges overlap iff `a.start < b.end && a.end > b.start`.
    pub fn overlaps(&self, other: &MinuteRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Minutes shared with `other`, zero when they do not overlap.
    pub fn overlap_minutes(&self, other: &MinuteRange) -> u32 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }
}

/// A booking that collides with a proposed one.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConflict<'a> {
    pub booking: &'a Booking,
    pub overlap_minutes: u32,
}

/// True if `[candidate_start, candidate_start + duration_min)` overlaps any
/// booked range. The end saturates at `u32::MAX`.
pub fn overlaps_any(candidate_start: u32, duration_min: u32, booked: &[MinuteRange]) -> bool {
    let candidate = MinuteRange::new(
        candidate_start,
        candidate_start.saturating_add(duration_min),
    );
    booked.iter().any(|b| candidate.overlaps(b))
}

/// Minute ranges of the bookings on `day_key`, in input order.
///
/// # Errors
/// Returns `AvailabilityError::MalformedClock` for a same-day booking with an
/// unparseable bound.
pub fn booked_ranges(bookings: &[Booking], day_key: &str) -> Result<Vec<MinuteRange>> {
    bookings
        .iter()
        .enumerate()
        .filter(|(_, b)| b.date == day_key)
        .map(|(idx, b)| booking_range(idx, b))
        .collect()
}

/// Group every booking's minute range by its date key.
///
/// Used when the same bookings are probed across many days: all bounds and
/// dates are validated once up front.
pub fn index_bookings<'a, I>(bookings: I) -> Result<HashMap<String, Vec<MinuteRange>>>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut by_date: HashMap<String, Vec<MinuteRange>> = HashMap::new();
    for (idx, booking) in bookings.into_iter().enumerate() {
        clock::parse_date(&format!("bookings[{idx}].date"), &booking.date)?;
        let range = booking_range(idx, booking)?;
        by_date.entry(booking.date.clone()).or_default().push(range);
    }
    Ok(by_date)
}

/// Existing bookings that overlap `proposed` on the same date.
///
/// Mirrors the double-booking check made before a new booking is stored.
pub fn find_booking_conflicts<'a>(
    proposed: &Booking,
    existing: &'a [Booking],
) -> Result<Vec<BookingConflict<'a>>> {
    let wanted = MinuteRange::new(
        clock::parse_clock("booking.start", &proposed.start)?,
        clock::parse_clock("booking.end", &proposed.end)?,
    );

    let mut conflicts = Vec::new();
    for (idx, booking) in existing.iter().enumerate() {
        if booking.date != proposed.date {
            continue;
        }
        let range = booking_range(idx, booking)?;
        if wanted.overlaps(&range) {
            conflicts.push(BookingConflict {
                booking,
                overlap_minutes: wanted.overlap_minutes(&range),
            });
        }
    }
    Ok(conflicts)
}

fn booking_range(idx: usize, booking: &Booking) -> Result<MinuteRange> {
    let start = clock::parse_clock(&format!("bookings[{idx}].start"), &booking.start)?;
    let end = clock::parse_clock(&format!("bookings[{idx}].end"), &booking.end)?;
    Ok(MinuteRange::new(start, end))
}
