use anyhow::{anyhow, Context, Result};
use rusqlite::params;

use super::shared::serialize_rule;
use super::EventRepository;
use crate::models::event::{Event, EventId};
use crate::models::occurrence::Occurrence;
use crate::utils::date::format_wall_clock;

impl<'a> EventRepository<'a> {
    /// Insert or overwrite an event row, keeping its id.
    pub fn save(&self, event: &Event) -> Result<()> {
        let rule_json = serialize_rule(event.recurrence.as_ref())?;

        self.conn
            .execute(
                "INSERT INTO events (
                    id, owner_id, title, description, location, color,
                    start_datetime, end_datetime, is_all_day, event_type, priority,
                    status, recurrence_rule, linked_task_id, reminder_minutes, is_private
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                ON CONFLICT(id) DO UPDATE SET
                    owner_id = excluded.owner_id,
                    title = excluded.title,
                    description = excluded.description,
                    location = excluded.location,
                    color = excluded.color,
                    start_datetime = excluded.start_datetime,
                    end_datetime = excluded.end_datetime,
                    is_all_day = excluded.is_all_day,
                    event_type = excluded.event_type,
                    priority = excluded.priority,
                    status = excluded.status,
                    recurrence_rule = excluded.recurrence_rule,
                    linked_task_id = excluded.linked_task_id,
                    reminder_minutes = excluded.reminder_minutes,
                    is_private = excluded.is_private,
                    updated_at = CURRENT_TIMESTAMP",
                params![
                    event.id.0,
                    event.owner_id.0,
                    event.title,
                    event.description,
                    event.location,
                    event.color,
                    format_wall_clock(event.span.start()),
                    format_wall_clock(event.span.end()),
                    event.all_day as i32,
                    event.event_type.as_str(),
                    event.priority.as_str(),
                    event.status.as_str(),
                    rule_json,
                    event.linked_task_id,
                    event.reminder_minutes,
                    event.is_private as i32,
                ],
            )
            .with_context(|| format!("Failed to save event {}", event.id))?;

        Ok(())
    }

    /// Delete an event. Its occurrences go with it through the cascade.
    pub fn delete(&self, id: EventId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.0])
            .context("Failed to delete event")?;

        if rows_affected == 0 {
            return Err(anyhow!("Event with id {} not found", id));
        }

        Ok(())
    }

    /// Drop the event's stored series and write `series` in its place.
    pub fn replace_occurrences(&self, event_id: EventId, series: &[Occurrence]) -> Result<()> {
        self.conn
            .execute("DELETE FROM event_occurrences WHERE event_id = ?", [event_id.0])
            .context("Failed to clear occurrences")?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO event_occurrences (
                event_id, seq, start_datetime, end_datetime, is_all_day,
                is_cancelled, title_override, description_override, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for occurrence in series {
            stmt.execute(params![
                event_id.0,
                occurrence.id.index,
                format_wall_clock(occurrence.span.start()),
                format_wall_clock(occurrence.span.end()),
                occurrence.all_day as i32,
                occurrence.is_cancelled as i32,
                occurrence.title_override,
                occurrence.description_override,
                occurrence.notes,
            ])
            .with_context(|| format!("Failed to insert occurrence {}", occurrence.id))?;
        }

        Ok(())
    }

    /// Overwrite the per-instance fields of one stored occurrence.
    pub fn save_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE event_occurrences
                 SET is_cancelled = ?1, title_override = ?2, description_override = ?3, notes = ?4
                 WHERE event_id = ?5 AND seq = ?6",
                params![
                    occurrence.is_cancelled as i32,
                    occurrence.title_override,
                    occurrence.description_override,
                    occurrence.notes,
                    occurrence.id.event_id.0,
                    occurrence.id.index,
                ],
            )
            .context("Failed to update occurrence")?;

        if rows_affected == 0 {
            return Err(anyhow!("Occurrence {} not found", occurrence.id));
        }

        Ok(())
    }
}
