// TimeSpan module
// Half-open wall-clock interval shared by events, occurrences and conflict checks

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::utils::date::{is_midnight, start_of_day, truncate_to_minute};

/// Half-open interval `[start, end)` in the configured zone's wall clock.
///
/// Values are kept at minute precision so durations are whole minutes. All-day
/// spans run from local midnight to the midnight after their last day, which
/// keeps consecutive days from touching at a shared instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpan", into = "RawSpan")]
pub struct TimeSpan {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Serialize, Deserialize)]
struct RawSpan {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawSpan> for TimeSpan {
    type Error = SchedulerError;

    fn try_from(raw: RawSpan) -> Result<Self> {
        TimeSpan::new(raw.start, raw.end)
    }
}

impl From<TimeSpan> for RawSpan {
    fn from(span: TimeSpan) -> Self {
        RawSpan {
            start: span.start,
            end: span.end,
        }
    }
}

impl TimeSpan {
    /// Create a span, rejecting zero-length and inverted intervals.
    ///
    /// # Examples
    /// ```
    /// use calendar_scheduler::models::time_span::TimeSpan;
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let span = TimeSpan::new(
    ///     day.and_hms_opt(9, 0, 0).unwrap(),
    ///     day.and_hms_opt(10, 30, 0).unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(span.duration_minutes(), 90);
    /// ```
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        let start = truncate_to_minute(start);
        let end = truncate_to_minute(end);
        if end <= start {
            return Err(SchedulerError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// A single all-day span: `[date 00:00, date+1 00:00)`.
    pub fn all_day(date: NaiveDate) -> Result<Self> {
        Self::all_day_range(date, date)
    }

    /// An all-day span covering `first..=last`.
    pub fn all_day_range(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        let start = start_of_day(first);
        let end = last
            .succ_opt()
            .map(start_of_day)
            .ok_or(SchedulerError::InvalidSpan { start, end: start })?;
        Self::new(start, end)
    }

    /// A timed span of `minutes` starting at `start`.
    pub fn starting_at(start: NaiveDateTime, minutes: i64) -> Result<Self> {
        let end = start
            .checked_add_signed(Duration::minutes(minutes))
            .ok_or(SchedulerError::InvalidSpan { start, end: start })?;
        Self::new(start, end)
    }

    /// Compose a span from split date and time inputs.
    ///
    /// Without a start time the span is all-day over `start_date..=end_date`.
    /// With a start time but no end time, the span runs to the end of
    /// `end_date`. Returns the span together with its all-day flag.
    pub fn compose(
        start_date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_date: NaiveDate,
        end_time: Option<NaiveTime>,
    ) -> Result<(Self, bool)> {
        let Some(start_time) = start_time else {
            return Ok((Self::all_day_range(start_date, end_date)?, true));
        };

        let start = start_date.and_time(start_time);
        let end = match end_time {
            Some(time) => end_date.and_time(time),
            None => end_date
                .succ_opt()
                .map(start_of_day)
                .ok_or(SchedulerError::InvalidSpan { start, end: start })?,
        };
        Ok((Self::new(start, end)?, false))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in whole minutes; at least 1 for every valid span.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Strict half-open overlap: spans that only touch do not overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Last calendar date the span covers.
    pub fn last_date(&self) -> NaiveDate {
        if is_midnight(self.end) {
            self.end.date().pred_opt().unwrap_or(self.start.date())
        } else {
            self.end.date()
        }
    }

    /// Inclusive date-component test used by range listings. Looser than
    /// [`TimeSpan::overlaps`]: a span only needs to share a calendar date with
    /// `from..=to`.
    pub fn intersects_dates(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start.date() <= to && self.last_date() >= from
    }

    /// Same duration, new start.
    pub fn moved_to(&self, start: NaiveDateTime) -> Result<Self> {
        Self::starting_at(truncate_to_minute(start), self.duration_minutes())
    }

    /// Same start, new end.
    pub fn with_end(&self, end: NaiveDateTime) -> Result<Self> {
        Self::new(self.start, end)
    }

    /// Widen to whole days, as used when an event becomes all-day.
    pub fn to_whole_days(&self) -> Result<Self> {
        Self::all_day_range(self.start.date(), self.last_date())
    }

    pub fn is_day_aligned(&self) -> bool {
        is_midnight(self.start) && is_midnight(self.end)
    }

    /// Display label: "All day" or "HH:MM - HH:MM".
    pub fn time_range_label(&self, all_day: bool) -> String {
        if all_day {
            return "All day".to_string();
        }
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
