use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{self, Result, Row};

use crate::error::SchedulerError;
use crate::models::recurrence::RecurrenceRule;
use crate::utils::date::parse_wall_clock;

pub(crate) fn serialize_rule(rule: Option<&RecurrenceRule>) -> Result<Option<String>> {
    rule.map(|rule| {
        serde_json::to_string(rule).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    })
    .transpose()
}

pub(crate) fn deserialize_rule(row: &Row<'_>, idx: usize) -> Result<Option<RecurrenceRule>> {
    let Some(json) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };

    let rule: RecurrenceRule = serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
    rule.validate()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;

    Ok(Some(rule))
}

pub(crate) fn wall_clock_column(row: &Row<'_>, idx: usize) -> Result<NaiveDateTime> {
    let value: String = row.get(idx)?;
    parse_wall_clock(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parsed_column<T>(row: &Row<'_>, idx: usize) -> Result<T>
where
    T: FromStr<Err = SchedulerError>,
{
    let value: String = row.get(idx)?;
    value
        .parse()
        .map_err(|e: SchedulerError| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn span_error(idx: usize, e: SchedulerError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}
