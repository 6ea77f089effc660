use chrono::NaiveDateTime;

use crate::utils::date::add_months_clamped;

/// Cursor after `steps` monthly steps from `anchor`. The day of month is
/// clamped to the target month's length, always measured from the anchor so a
/// series that starts on the 31st keeps landing on month ends.
pub(super) fn next(anchor: NaiveDateTime, interval: u32, steps: u32) -> Option<NaiveDateTime> {
    let months = interval.checked_mul(steps)?;
    add_months_clamped(anchor, months)
}
