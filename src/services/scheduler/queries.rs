use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use super::{read, EventScheduler};
use crate::error::{Result, SchedulerError};
use crate::models::event::{Event, EventId, EventStatus, EventType, OwnerId};
use crate::models::occurrence::CalendarEntry;
use crate::models::time_span::TimeSpan;
use crate::services::conflict::Conflict;
use crate::services::store::EventStore;
use crate::utils::date::start_of_day;

impl<S: EventStore> EventScheduler<S> {
    /// Entries whose span shares a calendar date with `from..=to`, ordered by
    /// start then event id. Cancelled occurrences are left out.
    pub fn list_between(
        &self,
        owner: OwnerId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>> {
        if to < from {
            return Err(SchedulerError::InvalidSpan {
                start: start_of_day(from),
                end: start_of_day(to),
            });
        }

        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        Ok(calendar
            .entries()
            .into_iter()
            .filter(|entry| entry.span.intersects_dates(from, to))
            .collect())
    }

    /// Live items of `owner` overlapping `span`, optionally ignoring one event.
    pub fn check_conflicts(
        &self,
        owner: OwnerId,
        span: &TimeSpan,
        exclude: Option<EventId>,
    ) -> Result<Vec<Conflict>> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        Ok(calendar.detector().detect(span, exclude))
    }

    /// Entries starting within `hours` after `now`, defaulting to the
    /// configured window. Cancelled events are skipped.
    pub fn upcoming(
        &self,
        owner: OwnerId,
        now: NaiveDateTime,
        hours: Option<u32>,
    ) -> Result<Vec<CalendarEntry>> {
        let hours = hours.unwrap_or(self.settings.upcoming_window_hours);
        // Windows past the calendar range are open-ended.
        let until = now
            .checked_add_signed(Duration::hours(i64::from(hours)))
            .unwrap_or(NaiveDateTime::MAX);

        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        Ok(calendar
            .entries()
            .into_iter()
            .filter(|entry| entry.status != EventStatus::Cancelled)
            .filter(|entry| entry.span.start() >= now && entry.span.start() < until)
            .collect())
    }

    /// [`upcoming`](Self::upcoming) for a UTC instant, read as wall clock in
    /// the configured timezone.
    pub fn upcoming_from_instant(
        &self,
        owner: OwnerId,
        instant: DateTime<Utc>,
        hours: Option<u32>,
    ) -> Result<Vec<CalendarEntry>> {
        self.upcoming(owner, self.settings.wall_clock(instant), hours)
    }

    /// Entries in progress at `now`.
    pub fn active_at(&self, owner: OwnerId, now: NaiveDateTime) -> Result<Vec<CalendarEntry>> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        Ok(calendar
            .entries()
            .into_iter()
            .filter(|entry| entry.status != EventStatus::Cancelled)
            .filter(|entry| entry.span.contains(now))
            .collect())
    }

    /// Live events whose last instance ended at or before `now`.
    pub fn overdue(&self, owner: OwnerId, now: NaiveDateTime) -> Result<Vec<Event>> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);

        let mut events: Vec<Event> = calendar
            .events
            .values()
            .filter(|event| event.is_live())
            .filter(|event| calendar.final_end(event).is_some_and(|end| end <= now))
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.span.start(), event.id));
        Ok(events)
    }

    pub fn by_type(&self, owner: OwnerId, event_type: EventType) -> Result<Vec<Event>> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);

        let mut events: Vec<Event> = calendar
            .events
            .values()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.span.start(), event.id));
        Ok(events)
    }
}
