//! WASM bindings for planner-engine.
//!
//! Exposes free slot search, reschedule patches, reminder fire times and
//! overlap reporting to the browser calendar via `wasm-bindgen`. Events cross
//! the boundary as JSON strings in the event store's document shape
//! (`{id, uid, title, date, startTime, endTime}`).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p planner-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/planner_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use planner_engine::event::{parse_time, Event, EventTimes};
use planner_engine::freebusy::{
    find_free_slot, normalize_duration, SlotOutcome, WorkingWindow, DEFAULT_DURATION_MINUTES,
};
use planner_engine::reminder::{reminder_fire_at, DEFAULT_LEAD_MINUTES};
use planner_engine::{find_overlaps, intervals_for, Interval};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Slot suggestion shaped for pre-filling the "add event" form.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionDto {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
}

impl From<SlotOutcome> for SuggestionDto {
    fn from(outcome: SlotOutcome) -> Self {
        match outcome {
            SlotOutcome::Found(slot) => Self {
                available: true,
                start_time: Some(slot.start_label()),
                end_time: Some(slot.end_label()),
            },
            SlotOutcome::Unavailable => Self {
                available: false,
                start_time: None,
                end_time: None,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlapDto {
    event_a: Option<String>,
    event_b: Option<String>,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn parse_events_json(json: &str) -> Result<Vec<Event>, JsValue> {
    serde_json::from_str(json).map_err(|e| js_err("Invalid events JSON", e))
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| js_err(&format!("Invalid date '{}'", s), e))
}

/// Parse a local wall-clock date-time: `YYYY-MM-DDTHH:MM`, optionally with
/// seconds and fractional seconds.
///
/// Events are stored in local time, so strings carrying `Z` or a UTC offset
/// (e.g. `Date.prototype.toISOString` output) are rejected. Callers format
/// the widget's `Date` in local time first, e.g.
/// `moment(d).format("YYYY-MM-DDTHH:mm")`.
fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, String> {
    if s.ends_with('Z') || DateTime::parse_from_rfc3339(s).is_ok() {
        return Err(format!(
            "Invalid datetime '{}': expected local time without a UTC offset",
            s
        ));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, JsValue> {
    parse_local_datetime(s).map_err(|e| JsValue::from_str(&e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_err("Serialization error", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// The day's bookings as `[{start, end}]` minute intervals, sorted by start.
#[wasm_bindgen(js_name = "intervalsFor")]
pub fn intervals_for_date(events_json: &str, date: &str) -> Result<String, JsValue> {
    let events = parse_events_json(events_json)?;
    let intervals: Vec<Interval> = intervals_for(&events, parse_date(date)?);
    to_json(&intervals)
}

/// Earliest free slot of `duration_minutes` on `date` within 09:00–18:00.
///
/// A missing or non-positive duration means 60 minutes. Returns
/// `{available, startTime, endTime}`; when nothing fits only
/// `{available: false}`.
#[wasm_bindgen(js_name = "suggestSlot")]
pub fn suggest_slot(events_json: &str, date: &str, duration_minutes: Option<i32>) -> Result<String, JsValue> {
    let events = parse_events_json(events_json)?;
    let intervals = intervals_for(&events, parse_date(date)?);
    let duration = normalize_duration(duration_minutes.map(i64::from), DEFAULT_DURATION_MINUTES);
    let outcome = find_free_slot(&intervals, duration, WorkingWindow::STANDARD);
    to_json(&SuggestionDto::from(outcome))
}

/// Store patch `{date, startTime, endTime}` for a drag or resize. Both
/// arguments are local date-times without an offset.
#[wasm_bindgen(js_name = "rescheduleFields")]
pub fn reschedule_fields(new_start: &str, new_end: &str) -> Result<String, JsValue> {
    let patch = EventTimes::from_gesture(parse_datetime(new_start)?, parse_datetime(new_end)?);
    to_json(&patch)
}

/// Local date-time (`YYYY-MM-DDTHH:MM:SS`) at which the reminder for an event
/// starting at `date` `start_time` should fire, or `undefined` if that moment
/// is not after `now`.
#[wasm_bindgen(js_name = "reminderFireAt")]
pub fn reminder_fire_at_js(
    date: &str,
    start_time: &str,
    now: &str,
    lead_minutes: Option<i32>,
) -> Result<Option<String>, JsValue> {
    let start = parse_time("start time", start_time).map_err(|e| js_err("Invalid time", e))?;
    let lead = lead_minutes.map(i64::from).unwrap_or(DEFAULT_LEAD_MINUTES);
    let fire_at = reminder_fire_at(parse_date(date)?, start, lead)
        .ok_or_else(|| JsValue::from_str("Reminder time is out of range"))?;
    if fire_at > parse_datetime(now)? {
        Ok(Some(fire_at.format("%Y-%m-%dT%H:%M:%S").to_string()))
    } else {
        Ok(None)
    }
}

/// Pairs of overlapping bookings as `[{eventA, eventB, overlapMinutes}]`,
/// identified by event id.
#[wasm_bindgen(js_name = "findOverlaps")]
pub fn find_overlaps_js(events_json: &str) -> Result<String, JsValue> {
    let events = parse_events_json(events_json)?;
    let dtos: Vec<OverlapDto> = find_overlaps(&events)
        .into_iter()
        .map(|o| OverlapDto {
            event_a: o.event_a.id.map(|id| id.0),
            event_b: o.event_b.id.map(|id| id.0),
            overlap_minutes: o.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}
