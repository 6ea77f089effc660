// Date utility functions
// Wall-clock helpers shared by spans, recurrence and persistence

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage format for wall-clock values.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn is_midnight(value: NaiveDateTime) -> bool {
    value.time() == NaiveTime::MIN
}

/// Rounds up to the next local midnight; midnight itself is returned unchanged.
pub fn ceil_to_midnight(value: NaiveDateTime) -> Option<NaiveDateTime> {
    if is_midnight(value) {
        Some(value)
    } else {
        value.date().succ_opt().map(start_of_day)
    }
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .date()
        .and_hms_opt(value.hour(), value.minute(), 0)
        .unwrap_or(value)
}

/// Adds calendar months, clamping the day to the last day of the target month.
pub fn add_months_clamped(value: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    value
        .date()
        .checked_add_months(Months::new(months))
        .map(|date| date.and_time(value.time()))
}

/// Weekday index with Sunday as 0, matching the stored day-of-week sets.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn format_wall_clock(value: NaiveDateTime) -> String {
    value.format(WALL_CLOCK_FORMAT).to_string()
}

pub fn parse_wall_clock(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, WALL_CLOCK_FORMAT)
}
