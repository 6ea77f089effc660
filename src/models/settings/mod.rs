// Settings module
// Engine configuration loaded from TOML

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// IANA zone every wall-clock value is interpreted in.
    pub timezone: String,
    /// SQLite file; an in-memory database is used when unset.
    pub database_path: Option<PathBuf>,
    /// Quick-create duration in minutes.
    pub default_event_duration: u32,
    pub upcoming_window_hours: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            database_path: None,
            default_event_duration: 60,
            upcoming_window_hours: 24,
        }
    }
}

impl Settings {
    pub const MIN_EVENT_DURATION: u32 = 15;
    pub const MAX_EVENT_DURATION: u32 = 1440;

    pub fn validate(&self) -> Result<(), String> {
        self.tz()?;

        if !(Self::MIN_EVENT_DURATION..=Self::MAX_EVENT_DURATION)
            .contains(&self.default_event_duration)
        {
            return Err(format!(
                "default_event_duration must be between {} and {} minutes",
                Self::MIN_EVENT_DURATION,
                Self::MAX_EVENT_DURATION
            ));
        }

        if self.upcoming_window_hours == 0 {
            return Err("upcoming_window_hours must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("Unknown timezone '{}': {}", self.timezone, e))
    }

    /// Wall clock in the configured zone for a UTC instant. Falls back to UTC
    /// if the zone name does not parse.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self.tz() {
            Ok(tz) => instant.with_timezone(&tz).naive_local(),
            Err(_) => instant.naive_utc(),
        }
    }
}
