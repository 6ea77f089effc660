//! Persistence seam.
//! The scheduler reads one owner's snapshot at a time and hands back a full
//! write set per mutation; stores must apply a write set atomically.

use anyhow::Result;

use crate::models::event::{Event, EventId, OwnerId};
use crate::models::occurrence::Occurrence;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Everything persisted for one owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerSnapshot {
    pub events: Vec<Event>,
    pub occurrences: Vec<Occurrence>,
}

/// A single persisted change, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert or overwrite an event record.
    SaveEvent(Event),
    /// Drop every occurrence of the event and store the given series.
    ReplaceOccurrences(EventId, Vec<Occurrence>),
    /// Overwrite one occurrence's per-instance fields.
    SaveOccurrence(Occurrence),
    /// Delete an event together with its occurrences.
    DeleteEvent(EventId),
}

/// Changes committed together for one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSet {
    pub owner: OwnerId,
    pub changes: Vec<Change>,
}

impl WriteSet {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: Change) -> &mut Self {
        self.changes.push(change);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Storage backend for the scheduler.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore: Send + Sync {
    /// Load all events and occurrences belonging to `owner`.
    fn load_owner(&self, owner: OwnerId) -> Result<OwnerSnapshot>;

    /// Apply every change in `write_set` or none of them.
    fn commit(&self, write_set: &WriteSet) -> Result<()>;

    /// Owner of an event, if it exists at all.
    fn owner_of(&self, event: EventId) -> Result<Option<OwnerId>>;

    /// Highest event id ever stored, 0 when empty.
    fn max_event_id(&self) -> Result<i64>;
}
