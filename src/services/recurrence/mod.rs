//! Recurrence expansion.
//! Turns a rule and a base span into the ordered series of occurrences, with
//! one stepping function per frequency.

use chrono::{Months, NaiveDate, NaiveDateTime};

use crate::models::event::EventId;
use crate::models::occurrence::Occurrence;
use crate::models::recurrence::{Frequency, RecurrenceRule};
use crate::models::time_span::TimeSpan;

mod daily;
mod monthly;
mod weekly;
mod yearly;

/// Hard cap on materialized occurrences per event.
pub const MAX_OCCURRENCES: usize = 100;

/// Expand `rule` starting at `base` into occurrences of `parent`.
///
/// The base span is always occurrence 0, even when it starts after the rule's
/// end date. Further occurrences stop at the end date (inclusive, default one
/// year after the base start) or at [`MAX_OCCURRENCES`], whichever comes
/// first. Reaching the cap is a
/// truncation, not an error.
pub fn expand(
    rule: &RecurrenceRule,
    base: &TimeSpan,
    all_day: bool,
    parent: EventId,
) -> Vec<Occurrence> {
    expand_spans(rule, base)
        .into_iter()
        .enumerate()
        .map(|(index, span)| Occurrence::new(parent, index as u32, span, all_day))
        .collect()
}

/// Expansion without ids, used for pre-flight checks on unsaved drafts.
pub fn expand_spans(rule: &RecurrenceRule, base: &TimeSpan) -> Vec<TimeSpan> {
    let minutes = base.duration_minutes();
    let limit = limit_date(rule, base.start());

    let mut spans = Vec::new();
    let mut cursor = base.start();
    let mut steps = 0u32;

    while spans.len() < MAX_OCCURRENCES && (spans.is_empty() || cursor.date() <= limit) {
        match TimeSpan::starting_at(cursor, minutes) {
            Ok(span) => spans.push(span),
            Err(_) => break,
        }

        steps += 1;
        let Some(next) = step(rule, base.start(), cursor, steps) else {
            log::debug!(
                "Stopping {} expansion after {} occurrences: no further step",
                rule.frequency,
                spans.len()
            );
            break;
        };

        // Steps only move forward; anything else would repeat forever.
        if next <= cursor {
            break;
        }
        cursor = next;
    }

    spans
}

/// Inclusive last date an occurrence may start on.
pub fn limit_date(rule: &RecurrenceRule, base_start: NaiveDateTime) -> NaiveDate {
    rule.end_date.unwrap_or_else(|| {
        base_start
            .date()
            .checked_add_months(Months::new(12))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Advance from `cursor`. `steps` counts the steps taken so far including this
/// one; month-based frequencies use it to step from the anchor so clamped
/// month ends do not drift.
fn step(
    rule: &RecurrenceRule,
    anchor: NaiveDateTime,
    cursor: NaiveDateTime,
    steps: u32,
) -> Option<NaiveDateTime> {
    match rule.frequency {
        Frequency::Daily => daily::next(cursor, rule.interval),
        Frequency::Weekly => weekly::next(cursor, rule.interval, rule.active_days()),
        Frequency::Monthly => monthly::next(anchor, rule.interval, steps),
        Frequency::Yearly => yearly::next(anchor, rule.interval, steps),
    }
}
