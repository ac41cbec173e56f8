use crate::{AppState, error::AppError};
use api_client::error::ApiError;
use core_types::RateWindow;
use financing::accumulate_rates;
use rust_decimal::Decimal;

/// Fetches the daily series for `window`, accumulates it and overwrites the
/// snapshot. Returns the new rate.
///
/// The overwrite is not coordinated with purchases in flight: one priced
/// concurrently may see either the old or the new rate.
pub async fn refresh_interest_rate(state: &AppState, window: &RateWindow) -> Result<Decimal, AppError> {
    let series = state
        .rate_client
        .fetch_daily_rates(window.start, window.end)
        .await?;

    let rate = accumulate_rates(series.iter().map(|day| day.value))
        .map_err(|e| ApiError::InvalidSeries(e.to_string()))?;

    state
        .store
        .save_rate_snapshot(rate, &window.raw_start, &window.raw_end)
        .await?;

    tracing::info!(
        %rate,
        start = %window.start,
        end = %window.end,
        days = series.len(),
        "Interest-rate snapshot updated."
    );
    Ok(rate)
}
