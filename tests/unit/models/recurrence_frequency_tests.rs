// Unit tests for Frequency and the rule presets
// Parameterized with test-case over the public recurrence API

use calendar_scheduler::models::recurrence::{Frequency, RecurrenceRule};
use calendar_scheduler::SchedulerError;
use test_case::test_case;

#[test_case(RecurrenceRule::daily(), Frequency::Daily, 1; "daily preset")]
#[test_case(RecurrenceRule::weekly(), Frequency::Weekly, 1; "weekly preset")]
#[test_case(RecurrenceRule::fortnightly(), Frequency::Weekly, 2; "fortnightly is every other week")]
#[test_case(RecurrenceRule::monthly(), Frequency::Monthly, 1; "monthly preset")]
#[test_case(RecurrenceRule::quarterly(), Frequency::Monthly, 3; "quarterly is every third month")]
#[test_case(RecurrenceRule::yearly(), Frequency::Yearly, 1; "yearly preset")]
fn test_presets(rule: RecurrenceRule, frequency: Frequency, interval: u32) {
    assert_eq!(rule.frequency, frequency);
    assert_eq!(rule.interval, interval);
    assert!(rule.days_of_week.is_none());
    assert!(rule.end_date.is_none());
    assert!(rule.validate().is_ok());
}

#[test_case("daily", Frequency::Daily)]
#[test_case("WEEKLY", Frequency::Weekly)]
#[test_case(" monthly ", Frequency::Monthly)]
#[test_case("Yearly", Frequency::Yearly)]
fn test_frequency_from_str(input: &str, expected: Frequency) {
    assert_eq!(input.parse::<Frequency>().unwrap(), expected);
}

#[test_case("hourly"; "unsupported unit")]
#[test_case("fortnightly"; "preset name is not a frequency")]
#[test_case(""; "empty")]
fn test_frequency_rejects(input: &str) {
    assert!(matches!(
        input.parse::<Frequency>(),
        Err(SchedulerError::InvalidRecurrenceRule(_))
    ));
}

#[test_case(0 => false; "zero")]
#[test_case(1 => true; "lower bound")]
#[test_case(365 => true; "upper bound")]
#[test_case(366 => false; "above upper bound")]
#[test_case(400 => false; "far above")]
fn test_interval_range(interval: u32) -> bool {
    RecurrenceRule::new(Frequency::Daily, interval).is_ok()
}

#[test_case(Frequency::Daily, "daily")]
#[test_case(Frequency::Weekly, "weekly")]
#[test_case(Frequency::Monthly, "monthly")]
#[test_case(Frequency::Yearly, "yearly")]
fn test_frequency_display(frequency: Frequency, expected: &str) {
    assert_eq!(frequency.to_string(), expected);
    assert_eq!(
        serde_json::to_string(&frequency).unwrap(),
        format!("\"{}\"", expected)
    );
}
