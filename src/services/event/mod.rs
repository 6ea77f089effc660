//! SQLite event repository.
//! Row-level reads and writes for events and their occurrences, used by
//! `SqliteStore` inside a single transaction per write set.

use rusqlite::Connection;

pub mod crud;
pub mod queries;
mod shared;

/// Repository over the `events` and `event_occurrences` tables.
pub struct EventRepository<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> EventRepository<'a> {
    /// Create a new EventRepository with a database connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}
