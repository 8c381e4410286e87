//! Error types for slot-engine operations.

use thiserror::Error;

/// Contract violations in the inputs of a single resolution.
///
/// "No slot found" is never an error; it is `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvailabilityError {
    /// A clock string that is not `HH:MM`.
    #[error("malformed time in {field}: {value:?} (expected HH:MM)")]
    MalformedClock { field: String, value: String },

    /// A calendar date that is not `YYYY-MM-DD`.
    #[error("malformed date in {field}: {value:?} (expected YYYY-MM-DD)")]
    MalformedDate { field: String, value: String },

    #[error("invalid duration: {0} hours (must be finite and positive)")]
    InvalidDuration(f64),

    #[error("invalid duration: {0} hours rounds to zero minutes")]
    DurationRoundsToZero(f64),

    #[error("invalid step: {0} minutes (must be positive)")]
    InvalidStep(u32),

    /// A booking in a multi-cleaner batch that names no cleaner.
    #[error("unassigned booking at {field}: cleanerId is missing or blank")]
    UnassignedBooking { field: String },

    #[error("invalid duration tier {0:?} (expected field=hours)")]
    InvalidTier(String),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
