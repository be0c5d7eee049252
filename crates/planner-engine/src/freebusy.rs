//! Find the earliest free slot of a requested length inside the working day.
//!
//! A single left-to-right sweep over the day's intervals, sorted by start.
//! The cursor only ever moves forward to the furthest end seen so far, so
//! overlapping or nested bookings never reopen a gap that is actually busy.

use serde::{Deserialize, Serialize};

use crate::event::format_minutes;
use crate::interval::Interval;

/// Duration used when the caller gives none, or a non-positive one.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// The daily span searched for free slots, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub start: i64,
    pub end: i64,
}

impl WorkingWindow {
    /// 09:00–18:00.
    pub const STANDARD: WorkingWindow = WorkingWindow {
        start: 9 * 60,
        end: 18 * 60,
    };

    pub fn len_minutes(&self) -> i64 {
        self.end - self.start
    }
}

impl Default for WorkingWindow {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A suggested `[start, end)` slot, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: i64,
    pub end: i64,
    pub duration_minutes: i64,
}

impl FreeSlot {
    pub fn start_label(&self) -> String {
        format_minutes(self.start)
    }

    pub fn end_label(&self) -> String {
        format_minutes(self.end)
    }

    pub fn as_interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Result of a slot search. Running out of room is an ordinary answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotOutcome {
    Found(FreeSlot),
    Unavailable,
}

impl SlotOutcome {
    pub fn slot(&self) -> Option<&FreeSlot> {
        match self {
            SlotOutcome::Found(slot) => Some(slot),
            SlotOutcome::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SlotOutcome::Found(_))
    }
}

/// Resolve a requested duration: positive values are kept, anything else
/// falls back to `default`.
pub fn normalize_duration(requested: Option<i64>, default: i64) -> i64 {
    match requested {
        Some(minutes) if minutes > 0 => minutes,
        _ => default,
    }
}

/// First-fit search for `duration_minutes` inside `window`.
///
/// `intervals` must be sorted ascending by start (see
/// [`intervals_for`](crate::interval::intervals_for)). Returns the earliest
/// slot `[cursor, cursor + duration)` whose gap before the next booking is
/// long enough; a virtual booking at `window.end` closes the day.
///
/// A booking that starts after `window.end` still ends the day at
/// `window.end`: the slot never extends past the window.
pub fn find_free_slot(
    intervals: &[Interval],
    duration_minutes: i64,
    window: WorkingWindow,
) -> SlotOutcome {
    if duration_minutes <= 0 || duration_minutes > window.len_minutes() {
        return SlotOutcome::Unavailable;
    }

    let mut cursor = window.start;

    let closing = Interval::new(window.end, window.end);
    for interval in intervals.iter().chain(std::iter::once(&closing)) {
        // Bookings past closing time still only leave room up to window.end.
        let next_start = interval.start.min(window.end);
        if next_start - cursor >= duration_minutes {
            return SlotOutcome::Found(FreeSlot {
                start: cursor,
                end: cursor + duration_minutes,
                duration_minutes,
            });
        }
        cursor = cursor.max(interval.end);
    }

    SlotOutcome::Unavailable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(start, end)
    }

    #[test]
    fn empty_day_opens_the_window() {
        let outcome = find_free_slot(&[], 45, WorkingWindow::STANDARD);
        assert_eq!(
            outcome,
            SlotOutcome::Found(FreeSlot {
                start: 540,
                end: 585,
                duration_minutes: 45
            })
        );
    }

    #[test]
    fn booking_after_closing_does_not_stretch_the_day() {
        let outcome = find_free_slot(&[iv(540, 1060), iv(1100, 1200)], 30, WorkingWindow::STANDARD);
        assert_eq!(outcome, SlotOutcome::Unavailable);
    }

    #[test]
    fn normalize_duration_defaults() {
        assert_eq!(normalize_duration(None, 60), 60);
        assert_eq!(normalize_duration(Some(0), 60), 60);
        assert_eq!(normalize_duration(Some(-15), 60), 60);
        assert_eq!(normalize_duration(Some(25), 60), 25);
    }
}
