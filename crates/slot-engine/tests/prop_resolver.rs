//! Property-based tests for the slot resolver using proptest.
//!
//! These check laws that should hold for *any* schedule and bookings, not
//! just the scenarios in `resolver_tests.rs`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::clock::WEEKDAY_NAMES;
use slot_engine::{
    find_next_available, minutes_to_time, overlaps_any, time_to_minutes, Booking,
    CandidateOrder, Exception, Interval, MinuteRange, Resolver, ResolverOptions, WeeklySchedule,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// An interval on the half-hour grid, at least one hour long.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (12u32..=40, 2u32..=16).prop_map(|(start_half, len_half)| {
        let start = start_half * 30;
        let end = (start + len_half * 30).min(24 * 60);
        Interval::new(minutes_to_time(start), minutes_to_time(end))
    })
}

/// At most one interval per weekday, so declared and time order coincide.
fn arb_single_interval_schedule() -> impl Strategy<Value = WeeklySchedule> {
    prop::collection::vec(prop::option::of(arb_interval()), 7).prop_map(|days| {
        let mut schedule = WeeklySchedule::new();
        for (name, interval) in WEEKDAY_NAMES.iter().zip(days) {
            if let Some(interval) = interval {
                schedule.insert(name, vec![interval]);
            }
        }
        schedule
    })
}

fn arb_multi_interval_schedule() -> impl Strategy<Value = WeeklySchedule> {
    prop::collection::vec(prop::collection::vec(arb_interval(), 0..3), 7).prop_map(|days| {
        let mut schedule = WeeklySchedule::new();
        for (name, intervals) in WEEKDAY_NAMES.iter().zip(days) {
            schedule.insert(name, intervals);
        }
        schedule
    })
}

/// Bookings in the first two weeks after the base instant.
fn arb_bookings() -> impl Strategy<Value = Vec<Booking>> {
    prop::collection::vec((0u64..14, 14u32..44, 1u32..8), 0..12).prop_map(|raw| {
        raw.into_iter()
            .map(|(day, start_half, len_half)| {
                let date = base().date_naive() + chrono::Days::new(day);
                let start = start_half * 30;
                let end = (start + len_half * 30).min(24 * 60);
                Booking::new(
                    "cleaner",
                    date.format("%Y-%m-%d").to_string(),
                    minutes_to_time(start),
                    minutes_to_time(end),
                )
            })
            .collect()
    })
}

fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..7 * 24 * 60).prop_map(|offset| base() + Duration::minutes(offset))
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

fn chronological() -> Resolver {
    Resolver::new(ResolverOptions {
        order: CandidateOrder::Chronological,
        ..ResolverOptions::default()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn clock_strings_round_trip(minutes in 0u32..=1440) {
        prop_assert_eq!(time_to_minutes(&minutes_to_time(minutes)).unwrap(), minutes);
    }

    #[test]
    fn touching_bookings_never_conflict(
        start in 60u32..1200,
        duration in 1u32..180,
        before in 1u32..60,
        after in 1u32..60,
    ) {
        let end = start + duration;
        let booked = [
            MinuteRange::new(start - before, start),
            MinuteRange::new(end, end + after),
        ];
        prop_assert!(!overlaps_any(start, duration, &booked));
    }

    #[test]
    fn one_minute_into_candidate_conflicts(
        start in 60u32..1200,
        duration in 1u32..180,
        before in 1u32..60,
        after in 1u32..60,
    ) {
        let end = start + duration;
        prop_assert!(overlaps_any(start, duration, &[MinuteRange::new(start - before, start + 1)]));
        prop_assert!(overlaps_any(start, duration, &[MinuteRange::new(end - 1, end + after)]));
    }

    #[test]
    fn result_never_conflicts_or_precedes_now(
        schedule in arb_multi_interval_schedule(),
        bookings in arb_bookings(),
        hours in 1u32..=4,
        now in arb_now(),
    ) {
        let Some(slot) = find_next_available(&schedule, &[], &bookings, f64::from(hours), now).unwrap() else {
            return Ok(());
        };
        prop_assert!(slot.to_datetime() >= now - Duration::seconds(59));

        let day_key = slot.date.format("%Y-%m-%d").to_string();
        let booked = slot_engine::conflict::booked_ranges(&bookings, &day_key).unwrap();
        prop_assert!(!overlaps_any(slot.start_minute, hours * 60, &booked));
    }

    #[test]
    fn longer_duration_never_earlier_single_interval_days(
        schedule in arb_single_interval_schedule(),
        bookings in arb_bookings(),
        short in 1u32..=4,
        extra in 0u32..=3,
        now in arb_now(),
    ) {
        let a = find_next_available(&schedule, &[], &bookings, f64::from(short), now).unwrap();
        let b = find_next_available(&schedule, &[], &bookings, f64::from(short + extra), now).unwrap();
        if let Some(b) = b {
            prop_assert!(a.is_some());
            prop_assert!(a.unwrap() <= b);
        }
    }

    #[test]
    fn longer_duration_never_earlier_chronological(
        schedule in arb_multi_interval_schedule(),
        bookings in arb_bookings(),
        short in 1u32..=4,
        extra in 0u32..=3,
        now in arb_now(),
    ) {
        let resolver = chronological();
        let a = resolver.resolve(&schedule, &[], &bookings, f64::from(short), now).unwrap();
        let b = resolver.resolve(&schedule, &[], &bookings, f64::from(short + extra), now).unwrap();
        if let Some(b) = b {
            prop_assert!(a.is_some());
            prop_assert!(a.unwrap() <= b);
        }
    }

    #[test]
    fn non_matching_exceptions_have_no_effect(
        schedule in arb_multi_interval_schedule(),
        bookings in arb_bookings(),
        day in 0u64..14,
        shift in 1u32..30,
        now in arb_now(),
    ) {
        // Every exception is a declared interval shifted by a few minutes.
        let date = (base().date_naive() + chrono::Days::new(day)).format("%Y-%m-%d").to_string();
        let exceptions: Vec<Exception> = WEEKDAY_NAMES
            .iter()
            .flat_map(|name| schedule.intervals_for(name).to_vec())
            .map(|iv| {
                let start = time_to_minutes(&iv.start).unwrap();
                let end = time_to_minutes(&iv.end).unwrap();
                Exception::new(
                    date.clone(),
                    minutes_to_time(start.saturating_sub(shift)),
                    minutes_to_time(end),
                )
            })
            .collect();

        let without = find_next_available(&schedule, &[], &bookings, 1.0, now).unwrap();
        let with = find_next_available(&schedule, &exceptions, &bookings, 1.0, now).unwrap();
        prop_assert_eq!(without, with);
    }
}
