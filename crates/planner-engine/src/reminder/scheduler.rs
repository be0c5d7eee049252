//! Tokio-backed reminder registry.
//!
//! Each armed reminder is a task sleeping until its fire time, tracked by
//! event id so that deleting or moving the event can retract it. The
//! notification permission is read when the reminder fires, not when it is
//! armed.
//!
//! Arming must happen inside a Tokio runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    reminder_fire_at, reminder_message, ArmOutcome, Clock, Notifier, Permission, ReminderSettings,
    ReminderTask,
};
use crate::event::{Event, EventId};

/// Show `message` if permission allows.
///
/// `Undetermined` triggers a permission request; the message is shown only if
/// it resolves to `Granted` within `request_timeout`. Returns whether the
/// message was shown.
pub async fn deliver(notifier: &dyn Notifier, message: &str, request_timeout: Duration) -> bool {
    match notifier.permission() {
        Permission::Granted => {
            notifier.show(message);
            true
        }
        Permission::Denied => {
            debug!("notification permission denied; reminder suppressed");
            false
        }
        Permission::Undetermined => {
            match tokio::time::timeout(request_timeout, notifier.request_permission()).await {
                Ok(Permission::Granted) => {
                    notifier.show(message);
                    true
                }
                Ok(state) => {
                    debug!(?state, "permission request not granted; reminder suppressed");
                    false
                }
                Err(_) => {
                    warn!(
                        timeout_secs = request_timeout.as_secs(),
                        "permission request timed out; reminder abandoned"
                    );
                    false
                }
            }
        }
    }
}

struct ArmedReminder {
    generation: u64,
    task: ReminderTask,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    armed: HashMap<EventId, ArmedReminder>,
}

/// Arms, replaces and cancels reminders, one per event id.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: ReminderSettings,
    registry: Arc<Mutex<Registry>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, settings: ReminderSettings) -> Self {
        Self {
            notifier,
            clock,
            settings,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn settings(&self) -> ReminderSettings {
        self.settings
    }

    /// Arm a reminder for `event`, replacing any reminder already armed for
    /// the same id. If the fire time has passed (or cannot be computed), any
    /// previous reminder is still cancelled and nothing new is armed.
    pub fn arm(&self, event_id: &EventId, title: &str, date: NaiveDate, start_time: NaiveTime) -> ArmOutcome {
        let lead = self.settings.lead_minutes;
        let now = self.clock.now();

        let mut registry = self.lock();
        if let Some(previous) = registry.armed.remove(event_id) {
            previous.handle.abort();
            debug!(event_id = %event_id, "replaced armed reminder");
        }

        let Some(fire_at) = reminder_fire_at(date, start_time, lead) else {
            warn!(event_id = %event_id, %date, lead, "reminder time out of range; not armed");
            return ArmOutcome::OutOfRange;
        };

        if fire_at <= now {
            debug!(event_id = %event_id, %fire_at, %now, "reminder time already passed; not armed");
            return ArmOutcome::TooLate { fire_at };
        }

        // fire_at > now, so the conversion cannot fail; treat failure as
        // "too late" rather than panic.
        let Ok(delay) = (fire_at - now).to_std() else {
            return ArmOutcome::TooLate { fire_at };
        };

        registry.next_generation += 1;
        let generation = registry.next_generation;
        let task = ReminderTask {
            event_id: event_id.clone(),
            fire_at,
            message: reminder_message(title, lead),
        };

        let handle = tokio::spawn(Self::run(
            Arc::clone(&self.registry),
            Arc::clone(&self.notifier),
            task.clone(),
            generation,
            delay,
            self.settings.permission_timeout,
        ));

        info!(event_id = %event_id, %fire_at, delay_secs = delay.as_secs(), "reminder armed");
        registry.armed.insert(
            event_id.clone(),
            ArmedReminder {
                generation,
                task,
                handle,
            },
        );

        ArmOutcome::Armed { fire_at, delay }
    }

    /// Arm from a stored event. Events without an id cannot be tracked and
    /// are reported as not armed.
    pub fn arm_for(&self, event: &Event) -> Option<ArmOutcome> {
        let id = event.id.as_ref()?;
        Some(self.arm(id, &event.title, event.date, event.start_time))
    }

    /// Retract the reminder armed for `event_id`. Returns whether one was
    /// pending.
    pub fn cancel(&self, event_id: &EventId) -> bool {
        match self.lock().armed.remove(event_id) {
            Some(armed) => {
                armed.handle.abort();
                debug!(event_id = %event_id, "reminder cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let mut registry = self.lock();
        for (_, armed) in registry.armed.drain() {
            armed.handle.abort();
        }
    }

    pub fn is_armed(&self, event_id: &EventId) -> bool {
        self.lock().armed.contains_key(event_id)
    }

    pub fn pending(&self, event_id: &EventId) -> Option<ReminderTask> {
        self.lock().armed.get(event_id).map(|a| a.task.clone())
    }

    pub fn armed_count(&self) -> usize {
        self.lock().armed.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run(
        registry: Arc<Mutex<Registry>>,
        notifier: Arc<dyn Notifier>,
        task: ReminderTask,
        generation: u64,
        delay: Duration,
        permission_timeout: Duration,
    ) {
        tokio::time::sleep(delay).await;

        // Drop our own entry before delivering; a newer arm for the same
        // event has a different generation and is left alone.
        {
            let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
            if registry
                .armed
                .get(&task.event_id)
                .is_some_and(|a| a.generation == generation)
            {
                registry.armed.remove(&task.event_id);
            }
        }

        let shown = deliver(notifier.as_ref(), &task.message, permission_timeout).await;
        debug!(event_id = %task.event_id, shown, "reminder fired");
    }
}
