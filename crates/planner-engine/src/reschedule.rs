//! Turn a calendar drag or resize into a stored time change.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::RescheduleError;
use crate::event::{format_time, sort_chronologically, Event, EventTimes, OwnerId};
use crate::store::EventStore;

/// A successful move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rescheduled {
    /// The event with its new time fields.
    pub event: Event,
    /// Human-readable acknowledgment, e.g. `Standup → 2024-06-01 (14:00–14:45)`.
    pub acknowledgment: String,
    /// The owner's events re-read from the store after the write.
    pub events: Vec<Event>,
}

pub struct RescheduleCoordinator<S: EventStore + ?Sized> {
    store: Arc<S>,
    owner: OwnerId,
}

impl<S: EventStore + ?Sized> RescheduleCoordinator<S> {
    pub fn new(store: Arc<S>, owner: OwnerId) -> Self {
        Self { store, owner }
    }

    /// Move `event` to `[new_start, new_end)`.
    ///
    /// Only `date`, `startTime` and `endTime` are written; title, id and owner
    /// are untouched. Overlap with other events is not checked. The list
    /// refresh is issued only after the write has completed.
    #[instrument(skip(self, event), fields(event_id = ?event.id))]
    pub async fn move_event(
        &self,
        event: &Event,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> Result<Rescheduled, RescheduleError> {
        let event_id = event.id.clone().ok_or(RescheduleError::NotPersisted)?;
        let times = EventTimes::from_gesture(new_start, new_end);

        if let Err(source) = self.store.update_times(&event_id, times).await {
            error!(%event_id, error = %source, "failed to move event");
            return Err(RescheduleError::Storage {
                event_id,
                previous: event.times(),
                source,
            });
        }

        let acknowledgment = format!(
            "{} → {} ({}–{})",
            event.title,
            times.date,
            format_time(times.start_time),
            format_time(times.end_time)
        );
        info!(%event_id, "{acknowledgment}");

        let mut events = self
            .store
            .list_for_owner(&self.owner)
            .await
            .map_err(|source| RescheduleError::Refresh {
                event_id: event_id.clone(),
                source,
            })?;
        sort_chronologically(&mut events);

        Ok(Rescheduled {
            event: event.clone().with_times(&times),
            acknowledgment,
            events,
        })
    }
}
