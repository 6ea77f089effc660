use anyhow::Result;
use rusqlite::{self, OptionalExtension, Row};

use super::shared::{deserialize_rule, parsed_column, span_error, wall_clock_column};
use super::EventRepository;
use crate::models::event::{Event, EventId, OwnerId};
use crate::models::occurrence::{Occurrence, OccurrenceId};
use crate::models::time_span::TimeSpan;

const EVENT_COLUMNS: &str = "id, owner_id, title, description, location, color,
    start_datetime, end_datetime, is_all_day, event_type, priority, status,
    recurrence_rule, linked_task_id, reminder_minutes, is_private";

impl<'a> EventRepository<'a> {
    /// Retrieve an event by ID.
    pub fn get(&self, id: EventId) -> Result<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS);
        let event = self
            .conn
            .query_row(&sql, [id.0], map_event_row)
            .optional()?;
        Ok(event)
    }

    /// Every event of `owner`, ordered by start.
    pub fn list_for_owner(&self, owner: OwnerId) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE owner_id = ? ORDER BY start_datetime ASC, id ASC",
            EVENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let events = stmt
            .query_map([owner.0], map_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Every stored occurrence of `owner`'s events, grouped by event in series order.
    pub fn occurrences_for_owner(&self, owner: OwnerId) -> Result<Vec<Occurrence>> {
        let mut stmt = self.conn.prepare(
            "SELECT o.event_id, o.seq, o.start_datetime, o.end_datetime, o.is_all_day,
                    o.is_cancelled, o.title_override, o.description_override, o.notes
             FROM event_occurrences o
             JOIN events e ON e.id = o.event_id
             WHERE e.owner_id = ?
             ORDER BY o.event_id ASC, o.seq ASC",
        )?;

        let occurrences = stmt
            .query_map([owner.0], map_occurrence_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(occurrences)
    }

    pub fn owner_of(&self, id: EventId) -> Result<Option<OwnerId>> {
        let owner = self
            .conn
            .query_row("SELECT owner_id FROM events WHERE id = ?", [id.0], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(owner.map(OwnerId))
    }

    /// Highest stored event id, 0 for an empty table.
    pub fn max_id(&self) -> Result<i64> {
        let max = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM events", [], |row| row.get(0))?;
        Ok(max)
    }
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let start = wall_clock_column(row, 6)?;
    let end = wall_clock_column(row, 7)?;
    let span = TimeSpan::new(start, end).map_err(|e| span_error(7, e))?;

    Ok(Event {
        id: EventId(row.get(0)?),
        owner_id: OwnerId(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        color: row.get(5)?,
        span,
        all_day: row.get::<_, i32>(8)? != 0,
        event_type: parsed_column(row, 9)?,
        priority: parsed_column(row, 10)?,
        status: parsed_column(row, 11)?,
        recurrence: deserialize_rule(row, 12)?,
        linked_task_id: row.get(13)?,
        reminder_minutes: row.get(14)?,
        is_private: row.get::<_, i32>(15)? != 0,
    })
}

fn map_occurrence_row(row: &Row<'_>) -> rusqlite::Result<Occurrence> {
    let start = wall_clock_column(row, 2)?;
    let end = wall_clock_column(row, 3)?;
    let span = TimeSpan::new(start, end).map_err(|e| span_error(3, e))?;

    Ok(Occurrence {
        id: OccurrenceId::new(EventId(row.get(0)?), row.get(1)?),
        span,
        all_day: row.get::<_, i32>(4)? != 0,
        is_cancelled: row.get::<_, i32>(5)? != 0,
        title_override: row.get(6)?,
        description_override: row.get(7)?,
        notes: row.get(8)?,
    })
}
