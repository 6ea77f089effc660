// Occurrence module
// Materialized instances of events and the merged listing view

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::models::event::{Event, EventId, EventStatus, EventType, Priority};
use crate::models::time_span::TimeSpan;

/// Derived key: parent event plus position in the expanded series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccurrenceId {
    pub event_id: EventId,
    pub index: u32,
}

impl OccurrenceId {
    pub fn new(event_id: EventId, index: u32) -> Self {
        Self { event_id, index }
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.event_id.0, self.index)
    }
}

impl FromStr for OccurrenceId {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || SchedulerError::NotFound(format!("occurrence '{}'", value));
        let (event, index) = value.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            event_id: EventId(event.parse().map_err(|_| invalid())?),
            index: index.parse().map_err(|_| invalid())?,
        })
    }
}

/// One concrete instance of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub span: TimeSpan,
    pub all_day: bool,
    pub is_cancelled: bool,
    pub title_override: Option<String>,
    pub description_override: Option<String>,
    pub notes: Option<String>,
}

impl Occurrence {
    pub fn new(parent: EventId, index: u32, span: TimeSpan, all_day: bool) -> Self {
        Self {
            id: OccurrenceId::new(parent, index),
            span,
            all_day,
            is_cancelled: false,
            title_override: None,
            description_override: None,
            notes: None,
        }
    }

    pub fn parent_event_id(&self) -> EventId {
        self.id.event_id
    }

    pub fn effective_title<'a>(&'a self, parent: &'a Event) -> &'a str {
        self.title_override.as_deref().unwrap_or(&parent.title)
    }

    pub fn effective_description<'a>(&'a self, parent: &'a Event) -> Option<&'a str> {
        self.description_override
            .as_deref()
            .or(parent.description.as_deref())
    }

    /// Takes part in conflicts only while both it and its parent are live.
    pub fn is_live(&self, parent: &Event) -> bool {
        !self.is_cancelled && parent.is_live()
    }
}

/// Per-instance edits. Same `Option<Option<_>>` convention as `EventChanges`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceChanges {
    pub is_cancelled: Option<bool>,
    pub title_override: Option<Option<String>>,
    pub description_override: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl OccurrenceChanges {
    pub fn cancel() -> Self {
        Self {
            is_cancelled: Some(true),
            ..Default::default()
        }
    }

    pub fn restore() -> Self {
        Self {
            is_cancelled: Some(false),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, occurrence: &Occurrence) -> Occurrence {
        let mut updated = occurrence.clone();
        if let Some(is_cancelled) = self.is_cancelled {
            updated.is_cancelled = is_cancelled;
        }
        if let Some(ref title) = self.title_override {
            updated.title_override = title.clone().filter(|t| !t.trim().is_empty());
        }
        if let Some(ref description) = self.description_override {
            updated.description_override = description.clone();
        }
        if let Some(ref notes) = self.notes {
            updated.notes = notes.clone();
        }
        updated
    }
}

/// Which kind of record a listing entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Event,
    Occurrence { id: OccurrenceId },
}

/// Read-only view merging singular events and occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    #[serde(flatten)]
    pub kind: EntryKind,
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub span: TimeSpan,
    pub all_day: bool,
    pub event_type: EventType,
    pub priority: Priority,
    pub status: EventStatus,
}

impl CalendarEntry {
    pub fn for_event(event: &Event) -> Self {
        Self {
            kind: EntryKind::Event,
            event_id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            color: event.color.clone(),
            span: event.span,
            all_day: event.all_day,
            event_type: event.event_type,
            priority: event.priority,
            status: event.status,
        }
    }

    pub fn for_occurrence(parent: &Event, occurrence: &Occurrence) -> Self {
        Self {
            kind: EntryKind::Occurrence { id: occurrence.id },
            event_id: parent.id,
            title: occurrence.effective_title(parent).to_string(),
            description: occurrence.effective_description(parent).map(str::to_string),
            location: parent.location.clone(),
            color: parent.color.clone(),
            span: occurrence.span,
            all_day: occurrence.all_day,
            event_type: parent.event_type,
            priority: parent.priority,
            status: parent.status,
        }
    }

    pub fn occurrence_id(&self) -> Option<OccurrenceId> {
        match self.kind {
            EntryKind::Event => None,
            EntryKind::Occurrence { id } => Some(id),
        }
    }

    pub fn time_range_label(&self) -> String {
        self.span.time_range_label(self.all_day)
    }
}
