//! Property-based tests for free slot search using proptest.
//!
//! The sweep is checked against a brute-force scan of every start minute in
//! the working window.

use planner_engine::freebusy::{find_free_slot, SlotOutcome, WorkingWindow};
use planner_engine::interval::Interval;
use proptest::prelude::*;

const WINDOW: WorkingWindow = WorkingWindow::STANDARD;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A non-degenerate interval inside the working window.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (WINDOW.start..WINDOW.end)
        .prop_flat_map(|start| (Just(start), (start + 1)..=WINDOW.end))
        .prop_map(|(start, end)| Interval::new(start, end))
}

/// Up to 12 bookings, sorted by start the way `intervals_for` returns them.
fn arb_day() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec(arb_interval(), 0..12).prop_map(|mut v| {
        v.sort_by_key(|i| i.start);
        v
    })
}

fn arb_duration() -> impl Strategy<Value = i64> {
    1i64..=540
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Earliest start minute whose `[s, s + duration)` hits no booking.
fn brute_force_earliest(intervals: &[Interval], duration: i64) -> Option<i64> {
    (WINDOW.start..=WINDOW.end - duration).find(|&s| {
        let candidate = Interval::new(s, s + duration);
        intervals.iter().all(|i| !i.overlaps(&candidate))
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn found_slot_is_inside_window_and_free(day in arb_day(), duration in arb_duration()) {
        if let SlotOutcome::Found(slot) = find_free_slot(&day, duration, WINDOW) {
            prop_assert_eq!(slot.end - slot.start, duration);
            prop_assert!(slot.start >= WINDOW.start);
            prop_assert!(slot.end <= WINDOW.end);
            for booking in &day {
                prop_assert!(
                    !booking.overlaps(&slot.as_interval()),
                    "slot {:?} overlaps booking {:?}", slot, booking
                );
            }
        }
    }

    #[test]
    fn sweep_matches_brute_force(day in arb_day(), duration in arb_duration()) {
        let expected = brute_force_earliest(&day, duration);
        let actual = find_free_slot(&day, duration, WINDOW).slot().map(|s| s.start);
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn search_is_idempotent(day in arb_day(), duration in arb_duration()) {
        let first = find_free_slot(&day, duration, WINDOW);
        let second = find_free_slot(&day, duration, WINDOW);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn full_booking_never_fits(duration in arb_duration(), extra in arb_day()) {
        let mut day = vec![Interval::new(WINDOW.start, WINDOW.end)];
        day.extend(extra);
        day.sort_by_key(|i| i.start);
        prop_assert_eq!(find_free_slot(&day, duration, WINDOW), SlotOutcome::Unavailable);
    }

    #[test]
    fn oversized_request_never_fits(day in arb_day(), excess in 1i64..=600) {
        let duration = WINDOW.len_minutes() + excess;
        prop_assert_eq!(find_free_slot(&day, duration, WINDOW), SlotOutcome::Unavailable);
    }
}
