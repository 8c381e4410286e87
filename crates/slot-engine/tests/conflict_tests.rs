//! Tests for booking overlap detection.

use slot_engine::conflict::{booked_ranges, find_booking_conflicts, overlaps_any, MinuteRange};
use slot_engine::{AvailabilityError, Booking};

fn booking(date: &str, start: &str, end: &str) -> Booking {
    Booking::new("cleaner-1", date, start, end)
}

#[test]
fn overlapping_booking_detected() {
    // Candidate 09:00-11:00, booked 10:00-10:30.
    let booked = [MinuteRange::new(600, 630)];
    assert!(overlaps_any(540, 120, &booked));
}

#[test]
fn booking_ending_at_candidate_start_is_free() {
    // Booked 08:00-09:00, candidate 09:00-10:00.
    let booked = [MinuteRange::new(480, 540)];
    assert!(!overlaps_any(540, 60, &booked));
}

#[test]
fn booking_starting_at_candidate_end_is_free() {
    // Candidate 09:00-10:00, booked 10:00-11:00.
    let booked = [MinuteRange::new(600, 660)];
    assert!(!overlaps_any(540, 60, &booked));
}

#[test]
fn one_minute_shift_into_candidate_conflicts() {
    assert!(overlaps_any(540, 60, &[MinuteRange::new(480, 541)]));
    assert!(overlaps_any(540, 60, &[MinuteRange::new(599, 660)]));
}

#[test]
fn candidate_inside_booking_conflicts() {
    assert!(overlaps_any(600, 30, &[MinuteRange::new(540, 720)]));
}

#[test]
fn candidate_end_saturates_near_u32_max() {
    let near_max = u32::MAX - 10;
    assert!(overlaps_any(near_max, 60, &[MinuteRange::new(near_max + 5, u32::MAX)]));
    assert!(!overlaps_any(near_max, 60, &[MinuteRange::new(0, near_max)]));
}

#[test]
fn no_bookings_no_conflict() {
    assert!(!overlaps_any(540, 60, &[]));
}

#[test]
fn overlap_minutes_of_partial_and_disjoint_ranges() {
    let a = MinuteRange::new(540, 600);
    assert_eq!(a.overlap_minutes(&MinuteRange::new(570, 660)), 30);
    assert_eq!(a.overlap_minutes(&MinuteRange::new(600, 660)), 0);
    assert_eq!(a.overlap_minutes(&MinuteRange::new(480, 720)), 60);
}

#[test]
fn booked_ranges_only_for_requested_day() {
    let bookings = vec![
        booking("2026-03-02", "09:00", "10:00"),
        booking("2026-03-03", "11:00", "12:00"),
        booking("2026-03-02", "14:30", "16:00"),
    ];

    let ranges = booked_ranges(&bookings, "2026-03-02").unwrap();

    assert_eq!(
        ranges,
        vec![MinuteRange::new(540, 600), MinuteRange::new(870, 960)]
    );
}

#[test]
fn booked_ranges_ignores_malformed_bookings_on_other_days() {
    let bookings = vec![
        booking("2026-03-02", "09:00", "10:00"),
        booking("2026-03-03", "late", "later"),
    ];

    assert_eq!(booked_ranges(&bookings, "2026-03-02").unwrap().len(), 1);
    assert!(matches!(
        booked_ranges(&bookings, "2026-03-03"),
        Err(AvailabilityError::MalformedClock { ref field, .. }) if field == "bookings[1].start"
    ));
}

#[test]
fn proposed_booking_conflicts_reported_with_overlap() {
    let existing = vec![
        booking("2026-03-02", "09:00", "10:00"),
        booking("2026-03-02", "10:00", "11:00"),
        booking("2026-03-02", "12:00", "13:00"),
        booking("2026-03-03", "09:00", "13:00"),
    ];
    let proposed = booking("2026-03-02", "09:30", "11:00");

    let conflicts = find_booking_conflicts(&proposed, &existing).unwrap();

    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].booking, &existing[0]);
    assert_eq!(conflicts[0].overlap_minutes, 30);
    assert_eq!(conflicts[1].booking, &existing[1]);
    assert_eq!(conflicts[1].overlap_minutes, 60);
}

#[test]
fn adjacent_proposed_booking_has_no_conflicts() {
    let existing = vec![booking("2026-03-02", "09:00", "10:00")];
    let proposed = booking("2026-03-02", "10:00", "12:00");

    assert!(find_booking_conflicts(&proposed, &existing)
        .unwrap()
        .is_empty());
}
