//! The event store port and an in-memory implementation.
//!
//! The real store is a remote document database keyed by owner id; the engine
//! only needs the four calls below. Every call may fail and none of them are
//! transactional. Writes are last-write-wins.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::event::{Event, EventId, EventTimes, OwnerId};

#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events owned by `owner`, in store order.
    async fn list_for_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Event>>;

    /// Persist a new event and return the id the store assigned. Any `id`
    /// already on `event` is ignored.
    async fn insert(&self, event: Event) -> StoreResult<EventId>;

    /// Overwrite exactly the date and time fields of an existing event.
    async fn update_times(&self, id: &EventId, times: EventTimes) -> StoreResult<()>;

    async fn delete(&self, id: &EventId) -> StoreResult<()>;
}

/// Process-local store, used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
    next_id: AtomicU64,
    reject_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records. Records without an id get one;
    /// allocation continues after the highest seeded `evt-N`.
    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        let store = Self::new();
        let events: Vec<Event> = events.into_iter().collect();
        let highest = events
            .iter()
            .filter_map(|e| e.id.as_ref())
            .filter_map(|id| id.as_str().strip_prefix("evt-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        store.next_id.store(highest, Ordering::SeqCst);
        {
            let mut guard = store.lock();
            for mut event in events {
                if event.id.is_none() {
                    event.id = Some(store.allocate_id());
                }
                guard.push(event);
            }
        }
        store
    }

    /// Make every subsequent write fail with [`StoreError::Rejected`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Make every subsequent list call fail with [`StoreError::Unavailable`].
    /// Writes are unaffected.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.lock().clone()
    }

    fn allocate_id(&self) -> EventId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        EventId(format!("evt-{n}"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // A poisoned lock only means another writer panicked mid-push; the
        // vector itself is still well formed.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn list_for_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Event>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is unreachable".to_string()));
        }
        Ok(self
            .lock()
            .iter()
            .filter(|e| &e.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn insert(&self, mut event: Event) -> StoreResult<EventId> {
        self.check_writable()?;
        let id = self.allocate_id();
        event.id = Some(id.clone());
        self.lock().push(event);
        debug!(event_id = %id, "event inserted");
        Ok(id)
    }

    async fn update_times(&self, id: &EventId, times: EventTimes) -> StoreResult<()> {
        self.check_writable()?;
        let mut events = self.lock();
        let event = events
            .iter_mut()
            .find(|e| e.id.as_ref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        event.date = times.date;
        event.start_time = times.start_time;
        event.end_time = times.end_time;
        Ok(())
    }

    async fn delete(&self, id: &EventId) -> StoreResult<()> {
        self.check_writable()?;
        let mut events = self.lock();
        let before = events.len();
        events.retain(|e| e.id.as_ref() != Some(id));
        if events.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
