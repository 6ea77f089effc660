use std::collections::BTreeMap;

use crate::models::event::{Event, EventId, OwnerId};
use crate::models::occurrence::{CalendarEntry, Occurrence};
use crate::services::conflict::ConflictDetector;
use crate::services::store::{Change, OwnerSnapshot, WriteSet};

/// Cached view of one owner's events and materialized occurrences.
#[derive(Debug, Clone)]
pub(crate) struct OwnerCalendar {
    owner: OwnerId,
    pub(crate) events: BTreeMap<EventId, Event>,
    pub(crate) occurrences: BTreeMap<EventId, Vec<Occurrence>>,
}

impl OwnerCalendar {
    pub(crate) fn from_snapshot(owner: OwnerId, snapshot: OwnerSnapshot) -> Self {
        let events: BTreeMap<EventId, Event> = snapshot
            .events
            .into_iter()
            .filter(|event| event.owner_id == owner)
            .map(|event| (event.id, event))
            .collect();

        let mut occurrences: BTreeMap<EventId, Vec<Occurrence>> = BTreeMap::new();
        for occurrence in snapshot.occurrences {
            if events.contains_key(&occurrence.parent_event_id()) {
                occurrences
                    .entry(occurrence.parent_event_id())
                    .or_default()
                    .push(occurrence);
            }
        }
        for series in occurrences.values_mut() {
            series.sort_by_key(|o| o.id.index);
        }

        Self {
            owner,
            events,
            occurrences,
        }
    }

    pub(crate) fn detector(&self) -> ConflictDetector<'_> {
        ConflictDetector::new(self.owner, &self.events, &self.occurrences)
    }

    /// Mirror a write set the store has already committed.
    pub(crate) fn apply(&mut self, write_set: &WriteSet) {
        for change in &write_set.changes {
            match change {
                Change::SaveEvent(event) => {
                    self.events.insert(event.id, event.clone());
                }
                Change::ReplaceOccurrences(event_id, series) => {
                    if series.is_empty() {
                        self.occurrences.remove(event_id);
                    } else {
                        self.occurrences.insert(*event_id, series.clone());
                    }
                }
                Change::SaveOccurrence(occurrence) => {
                    if let Some(slot) = self
                        .occurrences
                        .get_mut(&occurrence.parent_event_id())
                        .and_then(|series| series.iter_mut().find(|o| o.id == occurrence.id))
                    {
                        *slot = occurrence.clone();
                    }
                }
                Change::DeleteEvent(event_id) => {
                    self.events.remove(event_id);
                    self.occurrences.remove(event_id);
                }
            }
        }
    }

    pub(crate) fn series(&self, event_id: EventId) -> &[Occurrence] {
        self.occurrences
            .get(&event_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Listing view: singular events as themselves, recurring events through
    /// their non-cancelled occurrences. Ordered by start, then event id.
    pub(crate) fn entries(&self) -> Vec<CalendarEntry> {
        let mut entries = Vec::new();

        for event in self.events.values() {
            if event.is_recurring() && self.occurrences.contains_key(&event.id) {
                entries.extend(
                    self.series(event.id)
                        .iter()
                        .filter(|o| !o.is_cancelled)
                        .map(|o| CalendarEntry::for_occurrence(event, o)),
                );
            } else {
                entries.push(CalendarEntry::for_event(event));
            }
        }

        entries.sort_by(|a, b| {
            a.span
                .start()
                .cmp(&b.span.start())
                .then_with(|| a.event_id.cmp(&b.event_id))
                .then_with(|| {
                    a.occurrence_id()
                        .map(|id| id.index)
                        .cmp(&b.occurrence_id().map(|id| id.index))
                })
        });
        entries
    }

    /// End of the event's last instance that still takes place.
    pub(crate) fn final_end(&self, event: &Event) -> Option<chrono::NaiveDateTime> {
        if event.is_recurring() && self.occurrences.contains_key(&event.id) {
            self.series(event.id)
                .iter()
                .filter(|o| !o.is_cancelled)
                .map(|o| o.span.end())
                .max()
        } else {
            Some(event.span.end())
        }
    }
}
