// Recurrence module
// Compact repeat rule attached to a base event

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

pub const MIN_INTERVAL: u32 = 1;
pub const MAX_INTERVAL: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Frequency {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl FromStr for Frequency {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(SchedulerError::InvalidRecurrenceRule(format!(
                "unrecognized frequency '{}'",
                other
            ))),
        }
    }
}

/// How a base event repeats.
///
/// `days_of_week` uses 0 = Sunday through 6 = Saturday and only affects weekly
/// rules. `end_date` bounds occurrence start dates inclusively; without it the
/// series runs one year past the base start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<BTreeSet<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// Create a rule, rejecting intervals outside `1..=365`.
    pub fn new(frequency: Frequency, interval: u32) -> Result<Self> {
        let rule = Self {
            frequency,
            interval,
            days_of_week: None,
            end_date: None,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn daily() -> Self {
        Self::every(Frequency::Daily, 1)
    }

    pub fn weekly() -> Self {
        Self::every(Frequency::Weekly, 1)
    }

    /// Every other week.
    pub fn fortnightly() -> Self {
        Self::every(Frequency::Weekly, 2)
    }

    pub fn monthly() -> Self {
        Self::every(Frequency::Monthly, 1)
    }

    /// Every third month.
    pub fn quarterly() -> Self {
        Self::every(Frequency::Monthly, 3)
    }

    pub fn yearly() -> Self {
        Self::every(Frequency::Yearly, 1)
    }

    fn every(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: None,
            end_date: None,
        }
    }

    /// Restrict a weekly rule to the given weekdays. An empty set clears the
    /// restriction.
    pub fn with_days_of_week(mut self, days: impl IntoIterator<Item = u8>) -> Result<Self> {
        let days: BTreeSet<u8> = days.into_iter().collect();
        self.days_of_week = if days.is_empty() { None } else { Some(days) };
        self.validate()?;
        Ok(self)
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Weekday filter that actually applies to expansion.
    pub fn active_days(&self) -> Option<&BTreeSet<u8>> {
        match self.frequency {
            Frequency::Weekly => self.days_of_week.as_ref().filter(|days| !days.is_empty()),
            _ => None,
        }
    }

    /// Check the rule on its own.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&self.interval) {
            return Err(SchedulerError::InvalidRecurrenceRule(format!(
                "interval {} is outside {}..={}",
                self.interval, MIN_INTERVAL, MAX_INTERVAL
            )));
        }

        if let Some(ref days) = self.days_of_week {
            if let Some(bad) = days.iter().find(|day| **day > 6) {
                return Err(SchedulerError::InvalidRecurrenceRule(format!(
                    "day of week {} is outside 0..=6",
                    bad
                )));
            }
        }

        Ok(())
    }

    /// Check the rule against the base event it is attached to.
    pub fn validate_for(&self, base_start: NaiveDateTime) -> Result<()> {
        self.validate()?;

        if let Some(end_date) = self.end_date {
            if end_date <= base_start.date() {
                return Err(SchedulerError::InvalidRecurrenceRule(format!(
                    "end date {} must be after the event start date {}",
                    end_date,
                    base_start.date()
                )));
            }
        }

        Ok(())
    }
}
