use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};

use crate::utils::date::weekday_index;

/// Longest single-day scan before falling back to the plain weekly cadence.
const SCAN_DAYS: u32 = 7;

/// Next weekly cursor.
///
/// Without a day set this is `interval` weeks ahead. With one, the next seven
/// days are scanned for a listed weekday; if none matches, the cursor jumps
/// `interval` weeks past the scanned position so a malformed set still
/// advances.
pub(super) fn next(
    cursor: NaiveDateTime,
    interval: u32,
    days: Option<&BTreeSet<u8>>,
) -> Option<NaiveDateTime> {
    let weeks = Duration::weeks(i64::from(interval));

    let Some(days) = days else {
        return cursor.checked_add_signed(weeks);
    };

    let mut candidate = cursor;
    for _ in 0..SCAN_DAYS {
        candidate = candidate.checked_add_signed(Duration::days(1))?;
        if days.contains(&weekday_index(candidate.date())) {
            return Some(candidate);
        }
    }

    candidate.checked_add_signed(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_plain_weekly() {
        assert_eq!(next(at(1), 1, None), Some(at(8)));
        assert_eq!(next(at(1), 2, None), Some(at(15)));
    }

    #[test]
    fn test_scans_to_next_listed_day() {
        let days: BTreeSet<u8> = [1, 3, 5].into_iter().collect();
        // Mon 1st -> Wed 3rd -> Fri 5th -> Mon 8th
        assert_eq!(next(at(1), 1, Some(&days)), Some(at(3)));
        assert_eq!(next(at(3), 1, Some(&days)), Some(at(5)));
        assert_eq!(next(at(5), 1, Some(&days)), Some(at(8)));
    }

    #[test]
    fn test_single_day_wraps_a_full_week() {
        let days: BTreeSet<u8> = [1].into_iter().collect();
        assert_eq!(next(at(1), 1, Some(&days)), Some(at(8)));
    }

    #[test]
    fn test_unreachable_days_fall_back_to_interval() {
        let days: BTreeSet<u8> = [9].into_iter().collect();
        // seven scanned days, then one more week
        assert_eq!(next(at(1), 1, Some(&days)), Some(at(15)));
    }
}
