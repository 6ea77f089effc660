use chrono::NaiveDateTime;

use crate::utils::date::add_months_clamped;

/// Cursor after `steps` yearly steps from `anchor`; Feb 29 falls back to
/// Feb 28 in common years.
pub(super) fn next(anchor: NaiveDateTime, interval: u32, steps: u32) -> Option<NaiveDateTime> {
    let months = interval.checked_mul(steps)?.checked_mul(12)?;
    add_months_clamped(anchor, months)
}
