//! One-shot reminders fired a fixed lead time before an event starts.
//!
//! The fire-time arithmetic and the host capabilities ([`Notifier`],
//! [`Clock`]) live here. The Tokio-backed [`ReminderScheduler`] that arms,
//! replaces and cancels timers is behind the `runtime` feature.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::event::EventId;

#[cfg(feature = "runtime")]
mod scheduler;

#[cfg(feature = "runtime")]
pub use scheduler::{deliver, ReminderScheduler};

/// Lead time used when none is configured.
pub const DEFAULT_LEAD_MINUTES: i64 = 10;

/// Longest accepted lead time: one week.
pub const MAX_LEAD_MINUTES: i64 = 7 * 24 * 60;

/// Tri-state notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Undetermined,
}

/// Notification capability supplied by the host environment.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Resolves to the new state.
    async fn request_permission(&self) -> Permission;

    fn show(&self, message: &str);
}

/// Source of the local wall-clock "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the machine's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A reminder waiting to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderTask {
    pub event_id: EventId,
    pub fire_at: NaiveDateTime,
    pub message: String,
}

/// What happened when a reminder was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArmOutcome {
    Armed {
        fire_at: NaiveDateTime,
        #[serde(skip)]
        delay: Duration,
    },
    /// The fire time was already at or before "now"; nothing was armed.
    TooLate { fire_at: NaiveDateTime },
    /// The fire time falls outside the representable calendar; nothing was
    /// armed.
    OutOfRange,
}

impl ArmOutcome {
    pub fn is_armed(&self) -> bool {
        matches!(self, ArmOutcome::Armed { .. })
    }
}

/// `date` at `start_time`, minus `lead_minutes`. `None` if the result is not
/// a representable date-time.
pub fn reminder_fire_at(
    date: NaiveDate,
    start_time: NaiveTime,
    lead_minutes: i64,
) -> Option<NaiveDateTime> {
    let lead = TimeDelta::try_minutes(lead_minutes)?;
    date.and_time(start_time).checked_sub_signed(lead)
}

pub fn reminder_message(title: &str, lead_minutes: i64) -> String {
    format!("Reminder: \"{title}\" starts in {lead_minutes} minutes.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub lead_minutes: i64,
    pub permission_timeout: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            lead_minutes: DEFAULT_LEAD_MINUTES,
            permission_timeout: Duration::from_secs(30),
        }
    }
}
