//! Refresh next-available fields for many cleaners at once.
//!
//! Each cleaner is resolved once per duration tier and the results are keyed
//! by the tier's field name, ready to be written back onto the cleaner
//! document. A cleaner whose data is malformed gets its error recorded and
//! the batch moves on.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, Utc};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, warn};

use crate::error::{AvailabilityError, Result};
use crate::resolver::{duration_minutes, PreparedCalendar, ResolvedSlot, Resolver};
use crate::schedule::{Booking, Exception, WeeklySchedule};

/// A service duration the platform advertises, and the cleaner field that
/// stores its next available start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationTier {
    pub field: String,
    pub hours: f64,
}

impl DurationTier {
    pub fn new(field: impl Into<String>, hours: f64) -> Self {
        Self {
            field: field.into(),
            hours,
        }
    }

    /// Short (2h) and long (4h) cleanings.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("nextAvailableShort", 2.0),
            Self::new("nextAvailableLong", 4.0),
        ]
    }
}

impl FromStr for DurationTier {
    type Err = AvailabilityError;

    /// Parse `field=hours`, e.g. `nextAvailableShort=2`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AvailabilityError::InvalidTier(s.to_string());
        let (field, hours) = s.split_once('=').ok_or_else(invalid)?;
        let field = field.trim();
        if field.is_empty() {
            return Err(invalid());
        }
        let hours: f64 = hours.trim().parse().map_err(|_| invalid())?;
        duration_minutes(hours)?;
        Ok(Self::new(field, hours))
    }
}

/// The subset of a cleaner document the resolver needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanerRecord {
    #[serde(alias = "_id", alias = "cleanerId")]
    pub id: String,
    #[serde(default, alias = "availability")]
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub exceptions: Vec<Exception>,
}

/// Outcome of refreshing one cleaner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerRefresh {
    pub cleaner_id: String,
    /// Tier field name to next available start; `None` when nothing fits in
    /// the horizon. Empty when `error` is set.
    pub fields: BTreeMap<String, Option<ResolvedSlot>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<AvailabilityError>,
}

impl CleanerRefresh {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<AvailabilityError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}

/// Resolve every tier for one cleaner against that cleaner's bookings.
pub fn refresh_cleaner<'a, I>(
    cleaner: &CleanerRecord,
    bookings: I,
    tiers: &[DurationTier],
    resolver: &Resolver,
    now: DateTime<Utc>,
) -> Result<BTreeMap<String, Option<ResolvedSlot>>>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let calendar = PreparedCalendar::new(&cleaner.schedule, &cleaner.exceptions, bookings)?;
    tiers
        .iter()
        .map(|tier| {
            let slot = resolver.resolve_prepared(&calendar, tier.hours, now)?;
            Ok((tier.field.clone(), slot))
        })
        .collect()
}

/// Refresh every cleaner, returning one outcome per cleaner in input order.
///
/// `bookings` may span all cleaners; each cleaner only sees the bookings
/// carrying its id. Failures are logged and recorded, never propagated.
///
/// A booking with a missing or blank `cleanerId` could belong to anyone, so
/// while one is present every cleaner gets `UnassignedBooking` and no tier
/// is reported free.
pub fn refresh_all(
    cleaners: &[CleanerRecord],
    bookings: &[Booking],
    tiers: &[DurationTier],
    resolver: &Resolver,
    now: DateTime<Utc>,
) -> Vec<CleanerRefresh> {
    let mut by_cleaner: HashMap<&str, Vec<&Booking>> = HashMap::new();
    let mut unassigned = Vec::new();
    for (idx, booking) in bookings.iter().enumerate() {
        let cleaner_id = booking.cleaner_id.trim();
        if cleaner_id.is_empty() {
            unassigned.push(idx);
            continue;
        }
        by_cleaner.entry(cleaner_id).or_default().push(booking);
    }
    let unassigned_error = unassigned.first().map(|idx| AvailabilityError::UnassignedBooking {
        field: format!("bookings[{idx}].cleanerId"),
    });
    if let Some(err) = &unassigned_error {
        warn!(
            unassigned = unassigned.len(),
            error = %err,
            "bookings without a cleaner, refusing to publish availability"
        );
    }

    let refresh_one = |cleaner: &CleanerRecord| {
        let own = by_cleaner
            .get(cleaner.id.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let outcome = match &unassigned_error {
            Some(err) => Err(err.clone()),
            None => refresh_cleaner(cleaner, own.iter().copied(), tiers, resolver, now),
        };
        match outcome {
            Ok(fields) => CleanerRefresh {
                cleaner_id: cleaner.id.clone(),
                fields,
                error: None,
            },
            Err(err) => {
                warn!(cleaner_id = %cleaner.id, error = %err, "availability refresh failed, continuing batch");
                CleanerRefresh {
                    cleaner_id: cleaner.id.clone(),
                    fields: BTreeMap::new(),
                    error: Some(err),
                }
            }
        }
    };

    #[cfg(feature = "parallel")]
    let results: Vec<CleanerRefresh> = cleaners.par_iter().map(refresh_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<CleanerRefresh> = cleaners.iter().map(refresh_one).collect();

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    info!(
        cleaners = results.len(),
        failed,
        unassigned = unassigned.len(),
        tiers = tiers.len(),
        "availability refresh finished"
    );
    results
}
