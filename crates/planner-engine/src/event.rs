//! The stored event record and its wall-clock field helpers.
//!
//! Events are naive: a calendar date plus two `HH:MM` times of day, with no
//! time zone attached. On the wire they use the document shape of the event
//! store (`uid`, `startTime`, `endTime`).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Storage-assigned event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user owning an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled event as held by the event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Absent until the store has persisted the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(rename = "uid")]
    pub owner_id: OwnerId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl Event {
    /// The wall-clock instant the event starts.
    pub fn start_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// The wall-clock instant the event ends, on the same date.
    pub fn end_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    pub fn times(&self) -> EventTimes {
        EventTimes {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// Replace the time fields, leaving id, owner and title alone.
    pub fn with_times(mut self, times: &EventTimes) -> Self {
        self.date = times.date;
        self.start_time = times.start_time;
        self.end_time = times.end_time;
        self
    }

    /// One-line description, e.g. `"Standup" on 2024-06-01 (09:00 - 09:15)`.
    pub fn summary(&self) -> String {
        format!(
            "\"{}\" on {} ({} - {})",
            self.title,
            self.date,
            format_time(self.start_time),
            format_time(self.end_time)
        )
    }
}

/// The partial update applied when an event moves: exactly the date and the
/// two times of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTimes {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl EventTimes {
    /// Canonical fields for a calendar drag or resize.
    ///
    /// The date comes from `new_start` only; `new_end` contributes its time of
    /// day even when it falls on a different calendar day. Seconds are dropped.
    pub fn from_gesture(new_start: NaiveDateTime, new_end: NaiveDateTime) -> Self {
        Self {
            date: new_start.date(),
            start_time: truncate_to_minute(new_start.time()),
            end_time: truncate_to_minute(new_end.time()),
        }
    }
}

/// Sort events chronologically by `(date, start_time)`. Stable, so events
/// sharing a start keep their store order.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by_key(|e| (e.date, e.start_time));
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Minutes since midnight: `hour * 60 + minute`.
pub fn to_minutes(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Render a minute count as zero-padded `HH:MM`.
pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(hhmm::FORMAT).to_string()
}

/// Parse a form value in `HH:MM` form.
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), hhmm::FORMAT).map_err(|_| PlannerError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Parse a form value in `YYYY-MM-DD` form.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| PlannerError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Serde adapter storing a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Accept a trailing seconds component; stored values never carry one
        // but hand-edited fixtures sometimes do.
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_are_exact() {
        let t = NaiveTime::from_hms_opt(13, 7, 59).unwrap();
        assert_eq!(to_minutes(t), 13 * 60 + 7);
    }

    #[test]
    fn format_minutes_pads() {
        assert_eq!(format_minutes(540), "09:00");
        assert_eq!(format_minutes(65), "01:05");
        assert_eq!(format_minutes(1080), "18:00");
    }

    #[test]
    fn event_uses_store_document_shape() {
        let json = r#"{"id":"a1","uid":"u1","title":"Standup","date":"2024-06-01","startTime":"09:00","endTime":"09:15"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, Some(EventId::new("a1")));
        assert_eq!(event.owner_id, OwnerId::new("u1"));
        assert_eq!(event.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(serde_json::to_string(&event).unwrap(), json);
    }

    #[test]
    fn gesture_drops_seconds_and_takes_date_from_start() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(23, 30, 42)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(0, 15, 0)
            .unwrap();
        let times = EventTimes::from_gesture(start, end);
        assert_eq!(times.date, start.date());
        assert_eq!(format_time(times.start_time), "23:30");
        assert_eq!(format_time(times.end_time), "00:15");
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(matches!(
            parse_time("start time", "9am"),
            Err(PlannerError::InvalidField { field: "start time", .. })
        ));
    }
}
