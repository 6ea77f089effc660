use chrono::{NaiveDate, NaiveTime};

use super::{read, write, ConflictCheck, EventScheduler};
use crate::error::{Result, SchedulerError};
use crate::models::event::{Event, EventChanges, EventDraft, EventId, OwnerId};
use crate::models::occurrence::{Occurrence, OccurrenceChanges, OccurrenceId};
use crate::models::settings::Settings;
use crate::models::time_span::TimeSpan;
use crate::services::recurrence;
use crate::services::store::{Change, EventStore, WriteSet};

impl<S: EventStore> EventScheduler<S> {
    /// Create an event, materializing its occurrences when it recurs.
    ///
    /// With [`ConflictCheck::Enforce`] every generated span is checked and the
    /// call fails with `ConflictDetected` without persisting anything.
    pub fn create(&self, owner: OwnerId, draft: EventDraft, check: ConflictCheck) -> Result<Event> {
        draft.validate()?;

        let calendar = self.calendar(owner)?;
        let mut calendar = write(&calendar);

        if check.is_enforced() && draft.status.is_live() {
            let spans = match draft.recurrence {
                Some(ref rule) => recurrence::expand_spans(rule, &draft.span),
                None => vec![draft.span],
            };
            let conflicts = calendar.detector().detect_all(&spans, None);
            if !conflicts.is_empty() {
                log::info!(
                    "Rejected '{}' for {}: {} conflict(s)",
                    draft.title,
                    owner,
                    conflicts.len()
                );
                return Err(SchedulerError::ConflictDetected(conflicts));
            }
        }

        let event = Event::from_draft(self.allocate_id(), owner, draft);
        let mut write_set = WriteSet::new(owner);
        write_set.push(Change::SaveEvent(event.clone()));
        if let Some(ref rule) = event.recurrence {
            let series = recurrence::expand(rule, &event.span, event.all_day, event.id);
            log::debug!("Event {} expanded to {} occurrence(s)", event.id, series.len());
            write_set.push(Change::ReplaceOccurrences(event.id, series));
        }

        self.commit(&mut calendar, write_set)?;
        log::info!("Created event {} for {}", event.id, owner);
        Ok(event)
    }

    /// Create from a title, a date and an optional start time. Without a time
    /// the event is all-day; otherwise it lasts `duration` minutes, defaulting
    /// to the configured event duration.
    pub fn quick_create(
        &self,
        owner: OwnerId,
        title: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
        duration: Option<u32>,
    ) -> Result<Event> {
        let duration = duration.unwrap_or(self.settings.default_event_duration);
        if !(Settings::MIN_EVENT_DURATION..=Settings::MAX_EVENT_DURATION).contains(&duration) {
            return Err(SchedulerError::InvalidEvent(format!(
                "duration must be between {} and {} minutes, got {}",
                Settings::MIN_EVENT_DURATION,
                Settings::MAX_EVENT_DURATION,
                duration
            )));
        }

        let builder = EventDraft::builder().title(title);
        let builder = match time {
            Some(time) => {
                builder.span(TimeSpan::starting_at(date.and_time(time), i64::from(duration))?, false)
            }
            None => builder.span(TimeSpan::all_day(date)?, true),
        };

        self.create(owner, builder.build()?, ConflictCheck::Ignore)
    }

    /// Apply field changes. Occurrences are regenerated when the rule, span
    /// or all-day flag changed and kept as they are otherwise.
    pub fn update(
        &self,
        owner: OwnerId,
        id: EventId,
        changes: EventChanges,
        check: ConflictCheck,
    ) -> Result<Event> {
        self.modify(owner, id, check, |_| Ok(changes))
    }

    /// Delete an event together with all of its occurrences.
    pub fn delete(&self, owner: OwnerId, id: EventId) -> Result<()> {
        let calendar = self.calendar(owner)?;
        let mut calendar = write(&calendar);
        self.owned(&calendar, owner, id)?;

        let mut write_set = WriteSet::new(owner);
        write_set.push(Change::DeleteEvent(id));
        self.commit(&mut calendar, write_set)?;

        log::info!("Deleted event {} for {}", id, owner);
        Ok(())
    }

    /// Cancel, restore or annotate a single occurrence.
    pub fn update_occurrence(
        &self,
        owner: OwnerId,
        id: OccurrenceId,
        changes: OccurrenceChanges,
    ) -> Result<Occurrence> {
        let calendar = self.calendar(owner)?;
        let mut calendar = write(&calendar);
        self.owned(&calendar, owner, id.event_id)?;

        let current = calendar
            .series(id.event_id)
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| SchedulerError::NotFound(format!("occurrence {}", id)))?;
        let updated = changes.apply_to(current);
        if updated == *current {
            return Ok(updated);
        }

        let mut write_set = WriteSet::new(owner);
        write_set.push(Change::SaveOccurrence(updated.clone()));
        self.commit(&mut calendar, write_set)?;
        Ok(updated)
    }

    pub fn get(&self, owner: OwnerId, id: EventId) -> Result<Event> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        self.owned(&calendar, owner, id).cloned()
    }

    /// Materialized occurrences of an event, empty for singular events.
    pub fn occurrences(&self, owner: OwnerId, id: EventId) -> Result<Vec<Occurrence>> {
        let calendar = self.calendar(owner)?;
        let calendar = read(&calendar);
        self.owned(&calendar, owner, id)?;
        Ok(calendar.series(id).to_vec())
    }

    /// Shared write path for update, move and resize. `plan` sees the current
    /// event under the owner's write lock and returns the changes to apply.
    pub(super) fn modify<F>(
        &self,
        owner: OwnerId,
        id: EventId,
        check: ConflictCheck,
        plan: F,
    ) -> Result<Event>
    where
        F: FnOnce(&Event) -> Result<EventChanges>,
    {
        let calendar = self.calendar(owner)?;
        let mut calendar = write(&calendar);
        let current = self.owned(&calendar, owner, id)?.clone();

        let changes = plan(&current)?;
        if changes.is_empty() {
            return Ok(current);
        }
        let (updated, regenerate) = changes.apply_to(&current)?;

        let series = match (&updated.recurrence, regenerate) {
            (Some(rule), true) => Some(recurrence::expand(rule, &updated.span, updated.all_day, id)),
            (None, true) => Some(Vec::new()),
            (_, false) => None,
        };

        if check.is_enforced() && updated.is_live() {
            let spans: Vec<TimeSpan> = match series {
                Some(ref series) if !series.is_empty() => series.iter().map(|o| o.span).collect(),
                Some(_) => vec![updated.span],
                None if updated.is_recurring() => calendar
                    .series(id)
                    .iter()
                    .filter(|o| !o.is_cancelled)
                    .map(|o| o.span)
                    .collect(),
                None => vec![updated.span],
            };
            let conflicts = calendar.detector().detect_all(&spans, Some(id));
            if !conflicts.is_empty() {
                log::info!(
                    "Rejected change to event {} for {}: {} conflict(s)",
                    id,
                    owner,
                    conflicts.len()
                );
                return Err(SchedulerError::ConflictDetected(conflicts));
            }
        }

        let mut write_set = WriteSet::new(owner);
        write_set.push(Change::SaveEvent(updated.clone()));
        if let Some(series) = series {
            log::debug!("Event {} re-expanded to {} occurrence(s)", id, series.len());
            write_set.push(Change::ReplaceOccurrences(id, series));
        }
        self.commit(&mut calendar, write_set)?;

        Ok(updated)
    }
}
