//! Booked intervals of a single day, in minutes since midnight.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::{to_minutes, Event};

/// A half-open `[start, end)` minute range occupied by one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn of(event: &Event) -> Self {
        Self {
            start: to_minutes(event.start_time),
            end: to_minutes(event.end_time),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }

    /// Adjacent intervals (one ends where the other starts) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Intervals of the events that fall on `date`, ascending by start minute.
///
/// Overlapping bookings are kept as they are. The sort is stable, so events
/// with equal starts keep their input order.
pub fn intervals_for(events: &[Event], date: NaiveDate) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = events
        .iter()
        .filter(|e| e.date == date)
        .map(Interval::of)
        .collect();
    intervals.sort_by_key(|i| i.start);
    intervals
}
