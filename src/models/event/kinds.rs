use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Task,
    Meeting,
    Appointment,
    Reminder,
    Personal,
    Work,
    Social,
    #[default]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Task => "task",
            EventType::Meeting => "meeting",
            EventType::Appointment => "appointment",
            EventType::Reminder => "reminder",
            EventType::Personal => "personal",
            EventType::Work => "work",
            EventType::Social => "social",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "task" => Ok(EventType::Task),
            "meeting" => Ok(EventType::Meeting),
            "appointment" => Ok(EventType::Appointment),
            "reminder" => Ok(EventType::Reminder),
            "personal" => Ok(EventType::Personal),
            "work" => Ok(EventType::Work),
            "social" => Ok(EventType::Social),
            "other" => Ok(EventType::Other),
            other => Err(SchedulerError::InvalidEvent(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(SchedulerError::InvalidEvent(format!(
                "unknown priority '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle status of an event.
///
/// ```text
/// scheduled -> confirmed | cancelled | rescheduled
/// confirmed -> completed | cancelled | rescheduled
/// rescheduled -> confirmed | completed | cancelled
/// ```
/// `cancelled` and `completed` are terminal and drop out of conflict checks,
/// but the record itself is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
    Rescheduled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
            EventStatus::Rescheduled => "rescheduled",
        }
    }

    /// Whether events in this status take part in conflict detection.
    pub fn is_live(&self) -> bool {
        !matches!(self, EventStatus::Cancelled | EventStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        use EventStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Scheduled, Confirmed | Cancelled | Rescheduled)
                | (Confirmed, Completed | Cancelled | Rescheduled)
                | (Rescheduled, Confirmed | Completed | Cancelled)
        )
    }

    pub fn transition_to(&self, next: EventStatus) -> Result<EventStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(SchedulerError::InvalidStatusTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "scheduled" => Ok(EventStatus::Scheduled),
            "confirmed" => Ok(EventStatus::Confirmed),
            "cancelled" => Ok(EventStatus::Cancelled),
            "completed" => Ok(EventStatus::Completed),
            "rescheduled" => Ok(EventStatus::Rescheduled),
            other => Err(SchedulerError::InvalidEvent(format!(
                "unknown status '{}'",
                other
            ))),
        }
    }
}
