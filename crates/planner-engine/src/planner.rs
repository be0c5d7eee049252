//! Session-scoped planner: the operations the dashboard and calendar views
//! call.
//!
//! Every operation fetches a fresh snapshot from the store; nothing is cached
//! between calls. Storage failures are logged here and returned to the caller
//! that started the operation. They never touch reminders armed for other
//! events.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{error, info, instrument, warn};

use crate::config::PlannerConfig;
use crate::conflict::{overlaps_with, Overlap};
use crate::error::{PlannerError, RescheduleError, Result, StoreError};
use crate::event::{
    parse_date, parse_time, sort_chronologically, Event, EventId, EventTimes, OwnerId,
};
use crate::freebusy::{find_free_slot, normalize_duration, SlotOutcome};
use crate::interval::intervals_for;
use crate::reminder::{ArmOutcome, Clock, Notifier, ReminderScheduler};
use crate::reschedule::{RescheduleCoordinator, Rescheduled};
use crate::store::EventStore;

/// The signed-in user. Only `owner_id` scopes storage queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub owner_id: OwnerId,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            display_name: None,
        }
    }
}

/// Raw "add event" form values, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Added {
    pub event: Event,
    /// e.g. `"Standup" on 2024-06-01 (09:00 - 09:15)`.
    pub acknowledgment: String,
    pub reminder: Option<ArmOutcome>,
    /// The refreshed list. An `Err` here means the event was stored and its
    /// reminder armed, but re-reading the list failed; the add must not be
    /// retried.
    pub events: std::result::Result<Vec<Event>, StoreError>,
}

pub struct Planner<S: EventStore + ?Sized> {
    store: Arc<S>,
    session: Session,
    config: PlannerConfig,
    reminders: ReminderScheduler,
    coordinator: RescheduleCoordinator<S>,
}

impl<S: EventStore + ?Sized> Planner<S> {
    pub fn new(
        store: Arc<S>,
        session: Session,
        config: PlannerConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reminders = ReminderScheduler::new(notifier, clock, config.reminder_settings());
        let coordinator = RescheduleCoordinator::new(Arc::clone(&store), session.owner_id.clone());
        Self {
            store,
            session,
            config,
            reminders,
            coordinator,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// The owner's events, sorted by date then start time.
    pub async fn events(&self) -> Result<Vec<Event>> {
        let mut events = self
            .store
            .list_for_owner(&self.session.owner_id)
            .await
            .inspect_err(|e| error!(error = %e, "failed to fetch events"))?;
        sort_chronologically(&mut events);
        Ok(events)
    }

    /// Validate and store a new event, then arm its reminder.
    ///
    /// Every field is required; validation happens before the store is
    /// touched. Overlap with existing events is allowed. Once the insert has
    /// succeeded the call returns `Ok`, even if the list refresh fails.
    #[instrument(skip(self, draft), fields(owner = %self.session.owner_id))]
    pub async fn add_event(&self, draft: &EventDraft) -> Result<Added> {
        let event = self.validate(draft)?;

        let id = self
            .store
            .insert(event.clone())
            .await
            .inspect_err(|e| error!(error = %e, "failed to add event"))?;
        let event = Event {
            id: Some(id),
            ..event
        };
        let acknowledgment = event.summary();
        info!("event added: {acknowledgment}");

        let reminder = self.reminders.arm_for(&event);
        let events = self.events().await.map_err(|e| match e {
            PlannerError::Store(source) => source,
            other => StoreError::Unavailable(other.to_string()),
        });

        Ok(Added {
            event,
            acknowledgment,
            reminder,
            events,
        })
    }

    /// Delete an event and retract its reminder. Returns the refreshed list.
    #[instrument(skip(self), fields(owner = %self.session.owner_id))]
    pub async fn delete_event(&self, id: &EventId) -> Result<Vec<Event>> {
        self.store
            .delete(id)
            .await
            .inspect_err(|e| error!(event_id = %id, error = %e, "failed to delete event"))?;
        self.reminders.cancel(id);
        self.events().await
    }

    /// Suggest the earliest free slot of `duration_minutes` on `date`.
    ///
    /// A missing or non-positive duration uses the configured default.
    #[instrument(skip(self), fields(owner = %self.session.owner_id))]
    pub async fn suggest_slot(&self, date: NaiveDate, duration_minutes: Option<i64>) -> Result<SlotOutcome> {
        let duration = normalize_duration(duration_minutes, self.config.default_duration_minutes);
        let events = self.events().await?;
        let intervals = intervals_for(&events, date);
        let outcome = find_free_slot(&intervals, duration, self.config.working_window());
        if !outcome.is_available() {
            info!(%date, duration, "no free slot for the requested duration");
        }
        Ok(outcome)
    }

    /// Apply a calendar drag or resize, then re-arm the event's reminder for
    /// its new start.
    ///
    /// On a storage failure the error carries the pre-move fields; the caller
    /// should put the event back where it was. The reminder is re-armed
    /// whenever the write landed, including when only the refresh failed.
    pub async fn reschedule(
        &self,
        event: &Event,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> std::result::Result<Rescheduled, RescheduleError> {
        let result = self.coordinator.move_event(event, new_start, new_end).await;
        if matches!(result, Ok(_) | Err(RescheduleError::Refresh { .. })) {
            if let Some(id) = event.id.as_ref() {
                let times = EventTimes::from_gesture(new_start, new_end);
                self.reminders
                    .arm(id, &event.title, times.date, times.start_time);
            }
        }
        result
    }

    /// Stored events that overlap `candidate`. Overlap is permitted; this is
    /// for warning the user only.
    pub async fn overlaps_with(&self, candidate: &Event) -> Result<Vec<Overlap>> {
        let events = self.events().await?;
        let overlaps = overlaps_with(candidate, &events);
        if !overlaps.is_empty() {
            warn!(count = overlaps.len(), "event overlaps existing bookings");
        }
        Ok(overlaps)
    }

    fn validate(&self, draft: &EventDraft) -> Result<Event> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(PlannerError::MissingField("title"));
        }
        if draft.date.trim().is_empty() {
            return Err(PlannerError::MissingField("date"));
        }
        if draft.start_time.trim().is_empty() {
            return Err(PlannerError::MissingField("start time"));
        }
        if draft.end_time.trim().is_empty() {
            return Err(PlannerError::MissingField("end time"));
        }

        Ok(Event {
            id: None,
            owner_id: self.session.owner_id.clone(),
            title: title.to_string(),
            date: parse_date("date", &draft.date)?,
            start_time: parse_time("start time", &draft.start_time)?,
            end_time: parse_time("end time", &draft.end_time)?,
        })
    }
}
