use chrono::NaiveDateTime;

use super::{ConflictCheck, EventScheduler};
use crate::error::{Result, SchedulerError};
use crate::models::event::{Event, EventChanges, EventId, OwnerId};
use crate::services::store::EventStore;
use crate::utils::date::{ceil_to_midnight, start_of_day};

impl<S: EventStore> EventScheduler<S> {
    /// Move an event to `new_start`, keeping its duration. All-day events only
    /// take the date of `new_start`.
    ///
    /// Callers normally pass [`ConflictCheck::Enforce`]; the event itself is
    /// never counted as a conflict.
    pub fn move_to(
        &self,
        owner: OwnerId,
        id: EventId,
        new_start: NaiveDateTime,
        check: ConflictCheck,
    ) -> Result<Event> {
        let event = self.modify(owner, id, check, |current| {
            let start = if current.all_day {
                start_of_day(new_start.date())
            } else {
                new_start
            };
            Ok(EventChanges {
                span: Some(current.span.moved_to(start)?),
                ..Default::default()
            })
        })?;

        log::debug!("Moved event {} to {}", id, event.span.start());
        Ok(event)
    }

    /// Change the end of an event, keeping its start. The end of an all-day
    /// event is rounded up to the next midnight.
    pub fn resize(
        &self,
        owner: OwnerId,
        id: EventId,
        new_end: NaiveDateTime,
        check: ConflictCheck,
    ) -> Result<Event> {
        self.modify(owner, id, check, |current| {
            let start = current.span.start();
            let end = if current.all_day {
                ceil_to_midnight(new_end).ok_or(SchedulerError::InvalidSpan { start, end: new_end })?
            } else {
                new_end
            };
            Ok(EventChanges {
                span: Some(current.span.with_end(end)?),
                ..Default::default()
            })
        })
    }
}
