//! Conflict detection.
//! Read-only scan of one owner's events and occurrences for spans that
//! overlap a candidate under the strict half-open rule.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::event::{Event, EventId, OwnerId};
use crate::models::occurrence::{Occurrence, OccurrenceId};
use crate::models::time_span::TimeSpan;

/// An existing item that collides with a candidate span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub event_id: EventId,
    pub occurrence_id: Option<OccurrenceId>,
    pub title: String,
    pub span: TimeSpan,
}

impl Conflict {
    fn key(&self) -> (EventId, Option<u32>) {
        (self.event_id, self.occurrence_id.map(|id| id.index))
    }
}

/// Conflict scan over a consistent snapshot of one owner's data.
///
/// Singular events are checked by their own span. Recurring events are checked
/// through their occurrences only, since occurrence 0 is the base span.
pub struct ConflictDetector<'a> {
    owner: OwnerId,
    events: &'a BTreeMap<EventId, Event>,
    occurrences: &'a BTreeMap<EventId, Vec<Occurrence>>,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(
        owner: OwnerId,
        events: &'a BTreeMap<EventId, Event>,
        occurrences: &'a BTreeMap<EventId, Vec<Occurrence>>,
    ) -> Self {
        Self {
            owner,
            events,
            occurrences,
        }
    }

    /// Live items overlapping `candidate`, ordered by start.
    pub fn detect(&self, candidate: &TimeSpan, exclude: Option<EventId>) -> Vec<Conflict> {
        self.detect_all(std::slice::from_ref(candidate), exclude)
    }

    /// Union of conflicts for several candidate spans, each item reported once.
    pub fn detect_all(&self, candidates: &[TimeSpan], exclude: Option<EventId>) -> Vec<Conflict> {
        let mut seen = BTreeSet::new();
        let mut conflicts = Vec::new();

        for event in self.live_events(exclude) {
            match self.occurrences.get(&event.id) {
                Some(series) if event.is_recurring() => {
                    for occurrence in series.iter().filter(|o| !o.is_cancelled) {
                        if hits(&occurrence.span, candidates) {
                            let conflict = Conflict {
                                event_id: event.id,
                                occurrence_id: Some(occurrence.id),
                                title: occurrence.effective_title(event).to_string(),
                                span: occurrence.span,
                            };
                            if seen.insert(conflict.key()) {
                                conflicts.push(conflict);
                            }
                        }
                    }
                }
                _ => {
                    if hits(&event.span, candidates) {
                        let conflict = Conflict {
                            event_id: event.id,
                            occurrence_id: None,
                            title: event.title.clone(),
                            span: event.span,
                        };
                        if seen.insert(conflict.key()) {
                            conflicts.push(conflict);
                        }
                    }
                }
            }
        }

        conflicts.sort_by(|a, b| {
            a.span
                .start()
                .cmp(&b.span.start())
                .then_with(|| a.key().cmp(&b.key()))
        });
        conflicts
    }

    pub fn has_conflicts(&self, candidate: &TimeSpan, exclude: Option<EventId>) -> bool {
        !self.detect(candidate, exclude).is_empty()
    }

    fn live_events(&self, exclude: Option<EventId>) -> impl Iterator<Item = &'a Event> + '_ {
        self.events.values().filter(move |event| {
            event.owner_id == self.owner && event.is_live() && Some(event.id) != exclude
        })
    }
}

fn hits(span: &TimeSpan, candidates: &[TimeSpan]) -> bool {
    candidates.iter().any(|candidate| candidate.overlaps(span))
}
