//! Error types for planner-engine operations.

use thiserror::Error;

use crate::event::{EventId, EventTimes};

/// Failures reported by an [`EventStore`](crate::store::EventStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("event not found: {0}")]
    NotFound(EventId),

    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum PlannerError {
    /// A required form field was left empty. Raised before any storage call.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reschedule(#[from] RescheduleError),
}

/// Failures of a drag/resize reschedule.
#[derive(Error, Debug)]
pub enum RescheduleError {
    /// The event was never persisted, so there is nothing to update.
    #[error("event has no id and cannot be rescheduled")]
    NotPersisted,

    /// The storage write was rejected. `previous` holds the fields the event
    /// had before the gesture so the caller can put it back where it was.
    #[error("failed to move event {event_id}: {source}")]
    Storage {
        event_id: EventId,
        previous: EventTimes,
        #[source]
        source: StoreError,
    },

    /// The write landed but re-reading the event list failed.
    #[error("event {event_id} moved but the list refresh failed: {source}")]
    Refresh {
        event_id: EventId,
        #[source]
        source: StoreError,
    },
}

pub type Result<T> = std::result::Result<T, PlannerError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;
