// Calendar scheduling engine
// Recurrence expansion, conflict detection and per-owner event scheduling

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{Result, SchedulerError};
pub use models::event::{Event, EventChanges, EventDraft, EventId, OwnerId};
pub use models::occurrence::{CalendarEntry, Occurrence, OccurrenceChanges, OccurrenceId};
pub use models::recurrence::{Frequency, RecurrenceRule};
pub use models::settings::Settings;
pub use models::time_span::TimeSpan;
pub use services::conflict::{Conflict, ConflictDetector};
pub use services::scheduler::{ConflictCheck, EventScheduler};
pub use services::store::{EventStore, MemoryStore, SqliteStore};
