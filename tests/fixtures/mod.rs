// Test fixtures - reusable test data
// Provides consistent dates, drafts and schedulers across all test files

#![allow(dead_code)]

use calendar_scheduler::models::event::{EventDraft, OwnerId};
use calendar_scheduler::models::recurrence::RecurrenceRule;
use calendar_scheduler::models::settings::Settings;
use calendar_scheduler::services::scheduler::EventScheduler;
use calendar_scheduler::services::store::MemoryStore;
use chrono::{NaiveDate, NaiveDateTime};

pub const ALICE: OwnerId = OwnerId(1);
pub const BOB: OwnerId = OwnerId(2);

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    /// Monday, Jan 1 2024 at 09:00
    pub fn monday_morning() -> NaiveDateTime {
        at(2024, 1, 1, 9, 0)
    }

    /// Feb 29, 2024 at 12:00 (leap day)
    pub fn leap_day_2024() -> NaiveDateTime {
        at(2024, 2, 29, 12, 0)
    }
}

/// Sample drafts for testing
pub mod events {
    use super::dates::{at, date};
    use super::*;

    pub fn timed(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> EventDraft {
        EventDraft::builder().title(title).timed(start, end).build().unwrap()
    }

    /// Daily 09:00-09:15 standup, Jan 1 through Jan 5 2024
    pub fn standup() -> EventDraft {
        EventDraft::builder()
            .title("Standup")
            .timed(at(2024, 1, 1, 9, 0), at(2024, 1, 1, 9, 15))
            .recurrence(RecurrenceRule::daily().until(date(2024, 1, 5)))
            .build()
            .unwrap()
    }

    /// Jan 3 2024 09:10-09:40, overlapping the third standup
    pub fn planning() -> EventDraft {
        timed("Planning", at(2024, 1, 3, 9, 10), at(2024, 1, 3, 9, 40))
    }

    /// Fortnightly team sync on Mondays
    pub fn fortnightly_sync() -> EventDraft {
        EventDraft::builder()
            .title("Bi-weekly Team Sync")
            .timed(at(2024, 1, 1, 14, 0), at(2024, 1, 1, 15, 0))
            .recurrence(RecurrenceRule::fortnightly())
            .build()
            .unwrap()
    }

    /// Two-day all-day conference
    pub fn conference() -> EventDraft {
        EventDraft::builder()
            .title("All Day Conference")
            .all_day(date(2024, 1, 15), date(2024, 1, 16))
            .build()
            .unwrap()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn memory_scheduler() -> EventScheduler<MemoryStore> {
    init_logging();
    EventScheduler::new(MemoryStore::new(), Settings::default()).unwrap()
}
