//! WASM bindings for slot-engine.
//!
//! Exposes next-available resolution, slot grids and the batch refresh to
//! the JavaScript web application via `wasm-bindgen`. All complex types are
//! passed as JSON strings, using the same document shapes the application
//! stores (`schedule`/`availability`, `exceptions`, `bookings`).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use slot_engine::{
    Booking, CleanerRecord, DurationTier, Exception, Resolver, ResolverOptions, WeeklySchedule,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly inputs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// One cleaner's schedule data, plus optional resolver options.
#[derive(Deserialize)]
struct CleanerInput {
    #[serde(default, alias = "availability")]
    schedule: WeeklySchedule,
    #[serde(default)]
    exceptions: Vec<Exception>,
    #[serde(default)]
    bookings: Vec<Booking>,
    #[serde(default)]
    options: ResolverOptions,
}

/// All cleaners plus every booking in the horizon.
#[derive(Deserialize)]
struct RefreshInput {
    cleaners: Vec<CleanerRecord>,
    #[serde(default)]
    bookings: Vec<Booking>,
    #[serde(default)]
    options: ResolverOptions,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 instant, or take the current time when absent.
///
/// Accepts RFC 3339 (e.g., "2026-03-01T12:00:00Z") and naive datetimes
/// (e.g., "2026-03-01T12:00:00"), which are interpreted as UTC.
fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, String> {
    let Some(s) = now else {
        return Ok(Utc::now());
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn next_available_json(
    input_json: &str,
    duration_hours: f64,
    now: Option<&str>,
) -> Result<String, String> {
    let input: CleanerInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid cleaner JSON: {}", e))?;
    let now = parse_now(now)?;

    let slot = Resolver::new(input.options)
        .resolve(
            &input.schedule,
            &input.exceptions,
            &input.bookings,
            duration_hours,
            now,
        )
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&slot).map_err(|e| format!("Serialization error: {}", e))
}

fn slots_json(start: &str, end: &str, interval_minutes: Option<u32>) -> Result<String, String> {
    let interval = interval_minutes.unwrap_or(slot_engine::slots::DEFAULT_SLOT_MINUTES);
    let slots = slot_engine::generate_slots(start, end, interval).map_err(|e| e.to_string())?;
    serde_json::to_string(&slots).map_err(|e| format!("Serialization error: {}", e))
}

fn weekday_of(date: &str) -> Result<String, String> {
    let date = slot_engine::clock::parse_date("date", date).map_err(|e| e.to_string())?;
    Ok(slot_engine::weekday_name(date).to_string())
}

fn refresh_json(
    input_json: &str,
    tiers_json: Option<&str>,
    now: Option<&str>,
) -> Result<String, String> {
    let input: RefreshInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid refresh JSON: {}", e))?;
    let tiers: Vec<DurationTier> = match tiers_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid tiers JSON: {}", e))?
        }
        None => DurationTier::defaults(),
    };
    let now = parse_now(now)?;

    let results = slot_engine::refresh_all(
        &input.cleaners,
        &input.bookings,
        &tiers,
        &Resolver::new(input.options),
        now,
    );

    serde_json::to_string(&results).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Find the earliest free slot of `durationHours` for one cleaner.
///
/// `inputJson` is `{schedule, exceptions?, bookings?, options?}`. Returns a
/// JSON string: the slot start as `"YYYY-MM-DDTHH:MM:00Z"`, or `null` when
/// nothing fits within the horizon.
///
/// # Arguments
/// - `input_json` -- Cleaner schedule data as JSON
/// - `duration_hours` -- Requested duration in hours
/// - `now` -- Optional ISO 8601 instant to resolve from (defaults to now)
#[wasm_bindgen(js_name = "findNextAvailable")]
pub fn find_next_available(
    input_json: &str,
    duration_hours: f64,
    now: Option<String>,
) -> Result<String, JsValue> {
    next_available_json(input_json, duration_hours, now.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Split `start`–`end` into fixed-length slots for display.
///
/// Returns a JSON array of `{start, end}` objects.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    start: &str,
    end: &str,
    interval_minutes: Option<u32>,
) -> Result<String, JsValue> {
    slots_json(start, end, interval_minutes).map_err(|e| JsValue::from_str(&e))
}

/// Lowercase weekday name (`"sunday"` … `"saturday"`) of a `YYYY-MM-DD` date.
#[wasm_bindgen(js_name = "weekdayName")]
pub fn weekday_name(date: &str) -> Result<String, JsValue> {
    weekday_of(date).map_err(|e| JsValue::from_str(&e))
}

/// Resolve every cleaner for every duration tier.
///
/// `inputJson` is `{cleaners, bookings?, options?}`; `tiersJson` is an
/// optional array of `{field, hours}` (defaults to the short and long tiers).
/// Returns a JSON array of `{cleanerId, fields, error?}`.
#[wasm_bindgen(js_name = "refreshAvailability")]
pub fn refresh_availability(
    input_json: &str,
    tiers_json: Option<String>,
    now: Option<String>,
) -> Result<String, JsValue> {
    refresh_json(input_json, tiers_json.as_deref(), now.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}
