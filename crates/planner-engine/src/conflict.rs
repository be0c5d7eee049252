//! Detect overlapping bookings on the same day.
//!
//! Overlap is allowed everywhere in the planner; this module only reports it
//! so a caller can warn. Adjacent events (one ends exactly when another
//! starts) are NOT overlaps.

use serde::Serialize;

use crate::event::Event;
use crate::interval::Interval;

/// Two events whose time ranges intersect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    pub event_a: Event,
    pub event_b: Event,
    pub overlap_minutes: i64,
}

fn overlap_minutes(a: &Event, b: &Event) -> Option<i64> {
    if a.date != b.date {
        return None;
    }
    let (ia, ib) = (Interval::of(a), Interval::of(b));
    if !ia.overlaps(&ib) {
        return None;
    }
    Some(ia.end.min(ib.end) - ia.start.max(ib.start))
}

fn same_record(a: &Event, b: &Event) -> bool {
    matches!((&a.id, &b.id), (Some(x), Some(y)) if x == y)
}

/// Every overlapping pair within `events`, in input order.
pub fn find_overlaps(events: &[Event]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            if let Some(overlap_minutes) = overlap_minutes(a, b) {
                overlaps.push(Overlap {
                    event_a: a.clone(),
                    event_b: b.clone(),
                    overlap_minutes,
                });
            }
        }
    }

    overlaps
}

/// Events in `others` that overlap `candidate`. A stored copy of the
/// candidate itself (same id) is skipped.
pub fn overlaps_with(candidate: &Event, others: &[Event]) -> Vec<Overlap> {
    others
        .iter()
        .filter(|other| !same_record(candidate, other))
        .filter_map(|other| {
            overlap_minutes(candidate, other).map(|overlap_minutes| Overlap {
                event_a: candidate.clone(),
                event_b: other.clone(),
                overlap_minutes,
            })
        })
        .collect()
}
