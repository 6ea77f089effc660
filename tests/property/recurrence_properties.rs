// Property-based tests for spans, recurrence expansion and moves
// Exercises the invariants with random dates, durations and rules

#[path = "../fixtures/mod.rs"]
mod fixtures;

use calendar_scheduler::models::event::EventId;
use calendar_scheduler::models::recurrence::{Frequency, RecurrenceRule};
use calendar_scheduler::models::time_span::TimeSpan;
use calendar_scheduler::services::recurrence::{expand, expand_spans, MAX_OCCURRENCES};
use calendar_scheduler::services::scheduler::ConflictCheck;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use fixtures::dates::at;
use fixtures::{events, memory_scheduler, ALICE};

fn any_start() -> impl Strategy<Value = NaiveDateTime> {
    (2020..2030i32, 1..=12u32, 1..=28u32, 0..24u32, 0..60u32)
        .prop_map(|(y, m, d, h, min)| at(y, m, d, h, min))
}

fn any_span() -> impl Strategy<Value = TimeSpan> {
    (any_start(), 1..=2880i64).prop_map(|(start, minutes)| TimeSpan::starting_at(start, minutes).unwrap())
}

fn any_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Monthly),
        Just(Frequency::Yearly),
    ]
}

fn any_rule() -> impl Strategy<Value = RecurrenceRule> {
    (
        any_frequency(),
        1..=365u32,
        proptest::option::of(proptest::collection::btree_set(0..=6u8, 0..=7)),
    )
        .prop_map(|(frequency, interval, days)| {
            let rule = RecurrenceRule::new(frequency, interval).unwrap();
            match (frequency, days) {
                (Frequency::Weekly, Some(days)) => rule.with_days_of_week(days).unwrap(),
                _ => rule,
            }
        })
}

proptest! {
    /// Property: overlap is symmetric
    #[test]
    fn prop_overlap_is_symmetric(a in any_span(), b in any_span()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    /// Property: a span that starts where another ends never overlaps it
    #[test]
    fn prop_back_to_back_never_overlaps(a in any_span(), minutes in 1..=600i64) {
        let next = TimeSpan::starting_at(a.end(), minutes).unwrap();
        prop_assert!(!a.overlaps(&next));
        prop_assert!(!next.overlaps(&a));
    }

    /// Property: expansion never exceeds the cap and starts strictly increase
    #[test]
    fn prop_expansion_is_capped_and_increasing(rule in any_rule(), base in any_span()) {
        let spans = expand_spans(&rule, &base);

        prop_assert!(!spans.is_empty());
        prop_assert!(spans.len() <= MAX_OCCURRENCES);
        prop_assert_eq!(spans[0], base);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].start() < pair[1].start());
        }
        for span in &spans {
            prop_assert_eq!(span.duration_minutes(), base.duration_minutes());
        }
    }

    /// Property: expanding the same inputs twice yields the same series
    #[test]
    fn prop_expansion_is_idempotent(rule in any_rule(), base in any_span()) {
        prop_assert_eq!(
            expand(&rule, &base, false, EventId(1)),
            expand(&rule, &base, false, EventId(1))
        );
    }

    /// Property: weekly rules with days only land on those days
    #[test]
    fn prop_weekly_days_are_respected(
        days in proptest::collection::btree_set(0..=6u8, 1..=7),
        base in any_span(),
    ) {
        let rule = RecurrenceRule::weekly().with_days_of_week(days.clone()).unwrap();
        for span in expand_spans(&rule, &base).iter().skip(1) {
            let weekday = span.start().weekday().num_days_from_sunday() as u8;
            prop_assert!(days.contains(&weekday));
        }
    }

    /// Property: month-end anchors clamp to each month's last day
    #[test]
    fn prop_monthly_clamps_month_end(year in 2020..2030i32, hour in 0..23u32) {
        let base = TimeSpan::starting_at(at(year, 1, 31, hour, 0), 30).unwrap();
        let rule = RecurrenceRule::monthly().until(NaiveDate::from_ymd_opt(year, 12, 31).unwrap());
        let spans = expand_spans(&rule, &base);

        prop_assert_eq!(spans.len(), 12);
        for span in spans {
            let date = span.start().date();
            let next_day = date + Duration::days(1);
            prop_assert_eq!(next_day.day(), 1);
        }
    }

    /// Property: moving an event keeps its duration
    #[test]
    fn prop_move_preserves_duration(
        minutes in 15..=600i64,
        offset in -10_000..10_000i64,
    ) {
        let scheduler = memory_scheduler();
        let start = at(2024, 6, 1, 9, 0);
        let draft = events::timed("Movable", start, start + Duration::minutes(minutes));
        let event = scheduler.create(ALICE, draft, ConflictCheck::Ignore).unwrap();

        let moved = scheduler
            .move_to(ALICE, event.id, start + Duration::minutes(offset), ConflictCheck::Enforce)
            .unwrap();
        prop_assert_eq!(moved.duration_minutes(), minutes);
    }
}

#[test]
fn test_daily_ten_year_rule_hits_cap() {
    let base = TimeSpan::starting_at(fixtures::dates::monday_morning(), 30).unwrap();
    let rule = RecurrenceRule::daily().until(NaiveDate::from_ymd_opt(2034, 1, 1).unwrap());
    let spans = expand_spans(&rule, &base);

    assert_eq!(spans.len(), MAX_OCCURRENCES);
    assert_eq!(spans[99].start(), base.start() + Duration::days(99));
}

#[test]
fn test_leap_day_yearly_series() {
    let base = TimeSpan::starting_at(fixtures::dates::leap_day_2024(), 60).unwrap();
    let spans = expand_spans(&RecurrenceRule::yearly(), &base);
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].start().date(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
}
