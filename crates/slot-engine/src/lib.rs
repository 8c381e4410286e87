//! # slot-engine
//!
//! Next-available slot resolution for a cleaning-service booking platform.
//!
//! Given a cleaner's recurring weekly schedule, one-off exceptions and the
//! bookings already taken, the engine finds the earliest start of a free slot
//! of a requested duration within a 90-day horizon. Everything is a pure
//! function of its inputs; fetching documents and persisting results is left
//! to the caller.
//!
//! ## Modules
//!
//! - [`clock`] — `"HH:MM"` ↔ minutes, weekday names, date keys
//! - [`schedule`] — weekly schedule, exception and booking documents
//! - [`slots`] — fixed-size slot grids for display
//! - [`exceptions`] — drop intervals cancelled on a specific date
//! - [`conflict`] — half-open overlap checks against bookings
//! - [`resolver`] — the earliest-slot search
//! - [`batch`] — refresh many cleaners across duration tiers
//! - [`error`] — Error types

pub mod batch;
pub mod clock;
pub mod conflict;
pub mod error;
pub mod exceptions;
pub mod resolver;
pub mod schedule;
pub mod slots;

pub use batch::{refresh_all, CleanerRecord, CleanerRefresh, DurationTier};
pub use clock::{minutes_to_time, time_to_minutes, weekday_name};
pub use conflict::{find_booking_conflicts, overlaps_any, MinuteRange};
pub use error::AvailabilityError;
pub use exceptions::filter_exceptions;
pub use resolver::{
    find_next_available, find_next_available_now, CandidateOrder, ResolvedSlot, Resolver,
    ResolverOptions, HORIZON_DAYS,
};
pub use schedule::{Booking, Exception, Interval, WeeklySchedule};
pub use slots::{day_grid, generate_slots};
