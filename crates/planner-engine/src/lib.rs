//! # planner-engine
//!
//! Scheduling engine for a personal calendar.
//!
//! Everything here works on naive wall-clock values: an event is a calendar
//! date plus two `HH:MM` times, with no time zone. Storage and notification
//! delivery are supplied by the host through the [`store::EventStore`] and
//! [`reminder::Notifier`] traits.
//!
//! ## Modules
//!
//! - [`event`] — the stored event record, `HH:MM` helpers
//! - [`interval`] — a day's events as minute intervals
//! - [`freebusy`] — first-fit free slot inside the working window
//! - [`conflict`] — report overlapping bookings
//! - [`reschedule`] — drag/resize gesture → partial store update
//! - [`reminder`] — fire-time arithmetic; cancellable timers with `runtime`
//! - [`store`] — event store port and an in-memory store
//! - `planner` — session-scoped add/delete/list/suggest/reschedule (`runtime`)
//! - [`config`] — TOML configuration
//! - [`error`] — error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod event;
pub mod freebusy;
pub mod interval;
#[cfg(feature = "runtime")]
pub mod planner;
pub mod reminder;
pub mod reschedule;
pub mod store;

pub use config::PlannerConfig;
pub use conflict::{find_overlaps, Overlap};
pub use error::{PlannerError, RescheduleError, StoreError};
pub use event::{Event, EventId, EventTimes, OwnerId};
pub use freebusy::{find_free_slot, FreeSlot, SlotOutcome, WorkingWindow};
pub use interval::{intervals_for, Interval};
#[cfg(feature = "runtime")]
pub use planner::{EventDraft, Planner, Session};
pub use reminder::{ArmOutcome, Clock, Notifier, Permission, SystemClock};
#[cfg(feature = "runtime")]
pub use reminder::ReminderScheduler;
pub use reschedule::{RescheduleCoordinator, Rescheduled};
pub use store::{EventStore, InMemoryEventStore};
