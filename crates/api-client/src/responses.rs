use core_types::parse_decimal;
use rust_decimal::Decimal;
use serde_json::Value;

/// One day of the rate series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRate {
    /// The day as reported upstream (`dd/mm/yyyy`), when present.
    pub date: Option<String>,
    /// Percent for that day.
    pub value: Decimal,
}

/// Reads the series body, e.g. `[{"data":"02/01/2024","valor":"0.043739"}]`.
///
/// The body is trusted loosely: anything that is not a JSON array yields an
/// empty series, and an element without a numeric `valor` counts as zero.
pub fn parse_daily_rates(body: &str) -> Vec<DailyRate> {
    let records = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(records)) => records,
        Ok(_) | Err(_) => {
            tracing::warn!("Rate series body is not a JSON array; treating it as empty.");
            return Vec::new();
        }
    };

    records
        .iter()
        .map(|record| {
            let date = record
                .get("data")
                .and_then(Value::as_str)
                .map(str::to_string);
            let value = record.get("valor").and_then(|valor| match valor {
                Value::String(s) => parse_decimal(s),
                Value::Number(n) => parse_decimal(&n.to_string()),
                _ => None,
            });
            let value = value.unwrap_or_else(|| {
                tracing::warn!(?record, "Rate record has no numeric 'valor'; counting it as zero.");
                Decimal::ZERO
            });
            DailyRate { date, value }
        })
        .collect()
}
