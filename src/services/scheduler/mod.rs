//! Event scheduler.
//! Orchestrates create, update, move, resize and delete for each owner's
//! calendar, keeping materialized occurrences in step with their rules.
//!
//! Each owner's calendar sits behind its own `RwLock`. Mutations hold the
//! write lock from the conflict read through the store commit, so no other
//! change for that owner can interleave; reads share the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{
    Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use anyhow::anyhow;

use crate::error::{Result, SchedulerError};
use crate::models::event::{Event, EventId, OwnerId};
use crate::models::settings::Settings;
use crate::services::store::{EventStore, WriteSet};

mod calendar;
mod crud;
mod moves;
mod queries;

use calendar::OwnerCalendar;

/// Whether a mutation must be rejected when it would overlap live items.
///
/// There is no default; every mutation names its choice.
///
/// ```compile_fail
/// use calendar_scheduler::ConflictCheck;
///
/// let _check = ConflictCheck::default();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictCheck {
    /// Reject with [`SchedulerError::ConflictDetected`] and persist nothing.
    Enforce,
    /// Proceed regardless of overlaps.
    Ignore,
}

impl ConflictCheck {
    pub fn is_enforced(&self) -> bool {
        matches!(self, ConflictCheck::Enforce)
    }
}

pub struct EventScheduler<S: EventStore> {
    store: S,
    settings: Settings,
    calendars: Mutex<HashMap<OwnerId, Arc<RwLock<OwnerCalendar>>>>,
    next_id: AtomicI64,
}

impl<S: EventStore> EventScheduler<S> {
    /// Build a scheduler over `store`. Ids continue after the highest id the
    /// store has seen.
    pub fn new(store: S, settings: Settings) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| SchedulerError::Storage(anyhow!("Invalid settings: {}", e)))?;
        let max_id = store.max_event_id()?;
        log::debug!("Event scheduler starting after id {}", max_id);

        Ok(Self {
            store,
            settings,
            calendars: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(max_id + 1),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drop the cached calendar of `owner`; the next access reloads it.
    pub fn evict(&self, owner: OwnerId) {
        self.calendars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&owner);
    }

    fn calendar(&self, owner: OwnerId) -> Result<Arc<RwLock<OwnerCalendar>>> {
        if let Some(calendar) = self.cached(owner) {
            return Ok(calendar);
        }

        // Load without the registry lock so other owners are not held up.
        let snapshot = self.store.load_owner(owner)?;
        log::debug!(
            "Loaded {} event(s) and {} occurrence(s) for {}",
            snapshot.events.len(),
            snapshot.occurrences.len(),
            owner
        );
        let loaded = Arc::new(RwLock::new(OwnerCalendar::from_snapshot(owner, snapshot)));

        // A concurrent first access may have won; keep whichever landed first.
        let mut calendars = self.calendars.lock().unwrap_or_else(PoisonError::into_inner);
        let calendar = calendars.entry(owner).or_insert(loaded);
        Ok(Arc::clone(calendar))
    }

    fn cached(&self, owner: OwnerId) -> Option<Arc<RwLock<OwnerCalendar>>> {
        self.calendars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&owner)
            .map(Arc::clone)
    }

    fn allocate_id(&self) -> EventId {
        EventId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Persist `write_set`, then mirror it into the cache.
    fn commit(&self, calendar: &mut OwnerCalendar, write_set: WriteSet) -> Result<()> {
        if write_set.is_empty() {
            return Ok(());
        }
        self.store.commit(&write_set)?;
        calendar.apply(&write_set);
        Ok(())
    }

    /// Look up an owned event, telling missing ids apart from foreign ones.
    fn owned<'c>(&self, calendar: &'c OwnerCalendar, owner: OwnerId, id: EventId) -> Result<&'c Event> {
        if let Some(event) = calendar.events.get(&id) {
            return Ok(event);
        }
        match self.store.owner_of(id)? {
            Some(other) if other != owner => {
                log::warn!("{} attempted to access event {} of {}", owner, id, other);
                Err(SchedulerError::Unauthorized { owner, event: id })
            }
            _ => Err(SchedulerError::NotFound(format!("event {}", id))),
        }
    }
}

fn read(calendar: &RwLock<OwnerCalendar>) -> RwLockReadGuard<'_, OwnerCalendar> {
    calendar.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(calendar: &RwLock<OwnerCalendar>) -> RwLockWriteGuard<'_, OwnerCalendar> {
    calendar.write().unwrap_or_else(PoisonError::into_inner)
}
