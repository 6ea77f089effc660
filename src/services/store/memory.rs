use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Result};

use super::{Change, EventStore, OwnerSnapshot, WriteSet};
use crate::models::event::{Event, EventId, OwnerId};
use crate::models::occurrence::Occurrence;

#[derive(Debug, Clone, Default)]
struct Tables {
    events: BTreeMap<EventId, Event>,
    occurrences: BTreeMap<EventId, Vec<Occurrence>>,
    max_id: i64,
}

impl Tables {
    fn apply(&mut self, owner: OwnerId, change: &Change) -> Result<()> {
        match change {
            Change::SaveEvent(event) => {
                let stolen = self
                    .events
                    .get(&event.id)
                    .is_some_and(|existing| existing.owner_id != owner);
                if event.owner_id != owner || stolen {
                    return Err(anyhow!(
                        "Event {} belongs to {}, not {}",
                        event.id,
                        event.owner_id,
                        owner
                    ));
                }
                self.max_id = self.max_id.max(event.id.0);
                self.events.insert(event.id, event.clone());
            }
            Change::ReplaceOccurrences(event_id, series) => {
                self.require_owned(owner, *event_id)?;
                if series.is_empty() {
                    self.occurrences.remove(event_id);
                } else {
                    self.occurrences.insert(*event_id, series.clone());
                }
            }
            Change::SaveOccurrence(occurrence) => {
                let event_id = occurrence.parent_event_id();
                self.require_owned(owner, event_id)?;
                let slot = self
                    .occurrences
                    .get_mut(&event_id)
                    .and_then(|series| series.iter_mut().find(|o| o.id == occurrence.id))
                    .ok_or_else(|| anyhow!("Occurrence {} not found", occurrence.id))?;
                *slot = occurrence.clone();
            }
            Change::DeleteEvent(event_id) => {
                self.require_owned(owner, *event_id)?;
                self.events.remove(event_id);
                self.occurrences.remove(event_id);
            }
        }
        Ok(())
    }

    fn require_owned(&self, owner: OwnerId, event_id: EventId) -> Result<()> {
        match self.events.get(&event_id) {
            Some(event) if event.owner_id == owner => Ok(()),
            Some(_) => Err(anyhow!("Event {} is not owned by {}", event_id, owner)),
            None => Err(anyhow!("Event with id {} not found", event_id)),
        }
    }
}

/// Process-local store, used for tests and for embedding without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryStore {
    fn load_owner(&self, owner: OwnerId) -> Result<OwnerSnapshot> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);

        let events: Vec<Event> = tables
            .events
            .values()
            .filter(|event| event.owner_id == owner)
            .cloned()
            .collect();
        let occurrences = events
            .iter()
            .filter_map(|event| tables.occurrences.get(&event.id))
            .flatten()
            .cloned()
            .collect();

        Ok(OwnerSnapshot {
            events,
            occurrences,
        })
    }

    fn commit(&self, write_set: &WriteSet) -> Result<()> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);

        // Stage on a copy so a failing change leaves nothing applied.
        let mut staged = tables.clone();
        for change in &write_set.changes {
            staged.apply(write_set.owner, change)?;
        }
        *tables = staged;

        Ok(())
    }

    fn owner_of(&self, event: EventId) -> Result<Option<OwnerId>> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.events.get(&event).map(|event| event.owner_id))
    }

    fn max_event_id(&self) -> Result<i64> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.max_id)
    }
}
