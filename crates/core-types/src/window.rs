use crate::error::CoreError;
use crate::requests::{as_object, present};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// A validated date range for accumulating the daily interest-rate series.
///
/// The raw strings are kept because the snapshot stores exactly what the
/// caller sent, while the parsed dates drive the upstream query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub raw_start: String,
    pub raw_end: String,
}

impl RateWindow {
    /// Validates an already-parsed window against the floor date and today.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        raw_start: String,
        raw_end: String,
        floor: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        if start < floor {
            return Err(CoreError::InvalidWindow(format!(
                "start {start} is before {floor}"
            )));
        }
        if end > today {
            return Err(CoreError::InvalidWindow(format!(
                "end {end} is in the future"
            )));
        }
        Ok(Self {
            start,
            end,
            raw_start,
            raw_end,
        })
    }

    /// Validates a `PUT /juros` body. Both fields must be present before
    /// either is parsed.
    pub fn from_payload(body: &Value, floor: NaiveDate, today: NaiveDate) -> Result<Self, CoreError> {
        let fields = as_object(body)?;
        let raw_start = present(fields, "dataInicio")?;
        let raw_end = present(fields, "dataFinal")?;

        let (raw_start, start) = parse_field("dataInicio", raw_start)?;
        let (raw_end, end) = parse_field("dataFinal", raw_end)?;

        Self::new(start, end, raw_start, raw_end, floor, today)
    }
}

fn parse_field(name: &str, value: &Value) -> Result<(String, NaiveDate), CoreError> {
    let raw = value
        .as_str()
        .ok_or_else(|| CoreError::Malformed(format!("{name} must be a date string")))?;
    let date = parse_calendar_date(raw)
        .ok_or_else(|| CoreError::Malformed(format!("{name} is not a date: {raw:?}")))?;
    Ok((raw.to_string(), date))
}

/// Parses `YYYY-MM-DD`, an RFC 3339 timestamp, or `YYYY-MM-DD HH:MM:SS`,
/// keeping only the calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
}
