use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};

use super::{Change, EventStore, OwnerSnapshot, WriteSet};
use crate::models::event::{EventId, OwnerId};
use crate::models::settings::Settings;
use crate::services::database::Database;
use crate::services::event::EventRepository;

/// SQLite-backed store. Each write set runs inside one transaction.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Wrap an open database, creating tables if needed.
    pub fn new(db: Database) -> Result<Self> {
        db.initialize_schema()?;
        Ok(Self { db: Mutex::new(db) })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {}", path.display()))?;

        log::info!("Opening event database at {}", path_str);
        Self::new(Database::new(path_str)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Database::new(":memory:")?)
    }

    /// Open the database named in settings, or an in-memory one when none is set.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.database_path.as_deref() {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        }
    }
}

fn require_owned(repo: &EventRepository<'_>, owner: OwnerId, event: EventId) -> Result<()> {
    match repo.owner_of(event)? {
        Some(found) if found == owner => Ok(()),
        Some(_) => Err(anyhow!("Event {} is not owned by {}", event, owner)),
        None => Err(anyhow!("Event with id {} not found", event)),
    }
}

impl EventStore for SqliteStore {
    fn load_owner(&self, owner: OwnerId) -> Result<OwnerSnapshot> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let repo = EventRepository::new(db.connection());

        Ok(OwnerSnapshot {
            events: repo.list_for_owner(owner)?,
            occurrences: repo.occurrences_for_owner(owner)?,
        })
    }

    fn commit(&self, write_set: &WriteSet) -> Result<()> {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = db
            .connection_mut()
            .transaction()
            .context("Failed to begin transaction")?;

        {
            let repo = EventRepository::new(&tx);
            let owner = write_set.owner;

            for change in &write_set.changes {
                match change {
                    Change::SaveEvent(event) => {
                        if event.owner_id != owner {
                            return Err(anyhow!(
                                "Event {} belongs to {}, not {}",
                                event.id,
                                event.owner_id,
                                owner
                            ));
                        }
                        if let Some(existing) = repo.owner_of(event.id)? {
                            if existing != owner {
                                return Err(anyhow!(
                                    "Event {} is not owned by {}",
                                    event.id,
                                    owner
                                ));
                            }
                        }
                        repo.save(event)?;
                    }
                    Change::ReplaceOccurrences(event_id, series) => {
                        require_owned(&repo, owner, *event_id)?;
                        repo.replace_occurrences(*event_id, series)?;
                    }
                    Change::SaveOccurrence(occurrence) => {
                        require_owned(&repo, owner, occurrence.parent_event_id())?;
                        repo.save_occurrence(occurrence)?;
                    }
                    Change::DeleteEvent(event_id) => {
                        require_owned(&repo, owner, *event_id)?;
                        repo.delete(*event_id)?;
                    }
                }
            }
        }

        // Dropping an uncommitted transaction rolls it back, so early returns
        // above leave the database untouched.
        tx.commit().context("Failed to commit write set")?;
        log::debug!(
            "Committed {} change(s) for {}",
            write_set.changes.len(),
            write_set.owner
        );
        Ok(())
    }

    fn owner_of(&self, event: EventId) -> Result<Option<OwnerId>> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        EventRepository::new(db.connection()).owner_of(event)
    }

    fn max_event_id(&self) -> Result<i64> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        EventRepository::new(db.connection()).max_id()
    }
}
