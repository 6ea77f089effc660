// Scheduler error taxonomy

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::event::{EventId, EventStatus, OwnerId};
use crate::services::conflict::Conflict;

/// Errors returned by the scheduling engine.
///
/// Validation variants are produced before any state is touched, so a failed
/// call never leaves a partially applied change behind.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid time span: end {end} must be after start {start}")]
    InvalidSpan {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("cannot change status from {from} to {to}")]
    InvalidStatusTransition { from: EventStatus, to: EventStatus },

    #[error("time conflicts with {} existing item(s)", .0.len())]
    ConflictDetected(Vec<Conflict>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("event {event} is not owned by {owner}")]
    Unauthorized { owner: OwnerId, event: EventId },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl SchedulerError {
    /// Conflicts carried by a rejected mutation, if that is why it failed.
    pub fn conflicts(&self) -> Option<&[Conflict]> {
        match self {
            SchedulerError::ConflictDetected(conflicts) => Some(conflicts),
            _ => None,
        }
    }
}

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;
