use chrono::{Duration, NaiveDateTime};

pub(super) fn next(cursor: NaiveDateTime, interval: u32) -> Option<NaiveDateTime> {
    cursor.checked_add_signed(Duration::days(i64::from(interval)))
}
