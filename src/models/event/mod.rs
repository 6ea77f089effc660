// Event module
// Base event definition owned by a single user

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::models::recurrence::RecurrenceRule;
use crate::models::time_span::TimeSpan;

mod kinds;

pub use kinds::{EventStatus, EventType, Priority};

/// Longest reminder lead time accepted, one week.
pub const MAX_REMINDER_MINUTES: u32 = 10_080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner {}", self.0)
    }
}

/// A stored calendar event. `span` is the first occurrence's span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub span: TimeSpan,
    pub all_day: bool,
    pub event_type: EventType,
    pub priority: Priority,
    pub status: EventStatus,
    pub recurrence: Option<RecurrenceRule>,
    pub linked_task_id: Option<i64>,
    pub reminder_minutes: Option<u32>,
    pub is_private: bool,
}

impl Event {
    /// Materialize a validated draft under an assigned id.
    pub fn from_draft(id: EventId, owner_id: OwnerId, draft: EventDraft) -> Self {
        Self {
            id,
            owner_id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            color: draft.color,
            span: draft.span,
            all_day: draft.all_day,
            event_type: draft.event_type,
            priority: draft.priority,
            status: draft.status,
            recurrence: draft.recurrence,
            linked_task_id: draft.linked_task_id,
            reminder_minutes: draft.reminder_minutes,
            is_private: draft.is_private,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.title,
            self.color.as_deref(),
            self.reminder_minutes,
            &self.span,
            self.all_day,
            self.recurrence.as_ref(),
        )
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.span.duration_minutes()
    }

    /// Active at `now` (half-open).
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.span.contains(now)
    }

    /// Ended before `now` without being completed or cancelled.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        self.span.end() <= now && self.status.is_live()
    }
}

fn validate_fields(
    title: &str,
    color: Option<&str>,
    reminder_minutes: Option<u32>,
    span: &TimeSpan,
    all_day: bool,
    recurrence: Option<&RecurrenceRule>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(SchedulerError::InvalidEvent(
            "event title cannot be empty".to_string(),
        ));
    }

    if let Some(color) = color {
        if !is_hex_color(color) {
            return Err(SchedulerError::InvalidEvent(
                "color must be in hex format (#RRGGBB or #RGB)".to_string(),
            ));
        }
    }

    if let Some(minutes) = reminder_minutes {
        if minutes > MAX_REMINDER_MINUTES {
            return Err(SchedulerError::InvalidEvent(format!(
                "reminder cannot be more than {} minutes before the event",
                MAX_REMINDER_MINUTES
            )));
        }
    }

    if all_day && !span.is_day_aligned() {
        return Err(SchedulerError::InvalidEvent(
            "all-day events must start and end at midnight".to_string(),
        ));
    }

    if let Some(rule) = recurrence {
        rule.validate()?;
    }

    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Everything needed to create an event except the id and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub span: TimeSpan,
    pub all_day: bool,
    pub event_type: EventType,
    pub priority: Priority,
    pub status: EventStatus,
    pub recurrence: Option<RecurrenceRule>,
    pub linked_task_id: Option<i64>,
    pub reminder_minutes: Option<u32>,
    pub is_private: bool,
}

impl EventDraft {
    /// Create a builder for constructing drafts with optional fields
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.title,
            self.color.as_deref(),
            self.reminder_minutes,
            &self.span,
            self.all_day,
            self.recurrence.as_ref(),
        )?;

        // The end date is checked against the start the rule was given with.
        if let Some(ref rule) = self.recurrence {
            rule.validate_for(self.span.start())?;
        }
        Ok(())
    }
}

/// Builder for event drafts
///
/// # Examples
/// ```
/// use calendar_scheduler::models::event::EventDraft;
/// use calendar_scheduler::models::recurrence::RecurrenceRule;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let draft = EventDraft::builder()
///     .title("Standup")
///     .timed(day.and_hms_opt(9, 0, 0).unwrap(), day.and_hms_opt(9, 15, 0).unwrap())
///     .recurrence(RecurrenceRule::daily())
///     .build()
///     .unwrap();
/// assert_eq!(draft.span.duration_minutes(), 15);
/// ```
#[derive(Debug, Default)]
pub struct EventBuilder {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    color: Option<String>,
    span: Option<Result<TimeSpan>>,
    all_day: bool,
    event_type: EventType,
    priority: Priority,
    status: EventStatus,
    recurrence: Option<RecurrenceRule>,
    linked_task_id: Option<i64>,
    reminder_minutes: Option<u32>,
    is_private: bool,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Use an already validated span.
    pub fn span(mut self, span: TimeSpan, all_day: bool) -> Self {
        self.span = Some(Ok(span));
        self.all_day = all_day;
        self
    }

    /// Timed span from start and end; validated at `build`.
    pub fn timed(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.span = Some(TimeSpan::new(start, end));
        self.all_day = false;
        self
    }

    /// All-day span covering `first..=last`.
    pub fn all_day(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.span = Some(TimeSpan::all_day_range(first, last));
        self.all_day = true;
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    pub fn linked_task(mut self, task_id: i64) -> Self {
        self.linked_task_id = Some(task_id);
        self
    }

    pub fn reminder_minutes(mut self, minutes: u32) -> Self {
        self.reminder_minutes = Some(minutes);
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn build(self) -> Result<EventDraft> {
        let title = self
            .title
            .ok_or_else(|| SchedulerError::InvalidEvent("event title is required".to_string()))?;
        let span = self
            .span
            .ok_or_else(|| SchedulerError::InvalidEvent("event time span is required".to_string()))??;

        let draft = EventDraft {
            title,
            description: self.description,
            location: self.location,
            color: self.color,
            span,
            all_day: self.all_day,
            event_type: self.event_type,
            priority: self.priority,
            status: self.status,
            recurrence: self.recurrence,
            linked_task_id: self.linked_task_id,
            reminder_minutes: self.reminder_minutes,
            is_private: self.is_private,
        };

        draft.validate()?;
        Ok(draft)
    }
}

/// Partial update. `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub span: Option<TimeSpan>,
    pub all_day: Option<bool>,
    pub event_type: Option<EventType>,
    pub priority: Option<Priority>,
    pub status: Option<EventStatus>,
    pub recurrence: Option<Option<RecurrenceRule>>,
    pub linked_task_id: Option<Option<i64>>,
    pub reminder_minutes: Option<Option<u32>>,
    pub is_private: Option<bool>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }

    /// Apply to a copy of `event`, validating the result. The returned flag is
    /// true when occurrences must be regenerated.
    pub fn apply_to(&self, event: &Event) -> Result<(Event, bool)> {
        let mut updated = event.clone();

        if let Some(ref title) = self.title {
            updated.title = title.clone();
        }
        if let Some(ref description) = self.description {
            updated.description = description.clone();
        }
        if let Some(ref location) = self.location {
            updated.location = location.clone();
        }
        if let Some(ref color) = self.color {
            updated.color = color.clone();
        }
        if let Some(span) = self.span {
            updated.span = span;
        }
        if let Some(all_day) = self.all_day {
            updated.all_day = all_day;
        }
        if updated.all_day && !updated.span.is_day_aligned() {
            updated.span = updated.span.to_whole_days()?;
        }
        if let Some(event_type) = self.event_type {
            updated.event_type = event_type;
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if let Some(status) = self.status {
            updated.status = event.status.transition_to(status)?;
        }
        if let Some(ref recurrence) = self.recurrence {
            updated.recurrence = recurrence.clone();
        }
        if let Some(linked_task_id) = self.linked_task_id {
            updated.linked_task_id = linked_task_id;
        }
        if let Some(reminder_minutes) = self.reminder_minutes {
            updated.reminder_minutes = reminder_minutes;
        }
        if let Some(is_private) = self.is_private {
            updated.is_private = is_private;
        }

        updated.validate()?;
        if let Some(Some(ref rule)) = self.recurrence {
            rule.validate_for(updated.span.start())?;
        }

        let regenerate = updated.span != event.span
            || updated.all_day != event.all_day
            || updated.recurrence != event.recurrence;

        Ok((updated, regenerate))
    }
}
