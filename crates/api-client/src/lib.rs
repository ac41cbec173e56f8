use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::RateIndexSettings;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{DailyRate, parse_daily_rates};

/// The abstract interface for the daily interest-rate index.
/// This trait is the contract the rate updater uses, allowing the
/// underlying implementation (live or stub) to be swapped out.
#[async_trait]
pub trait RateIndexClient: Send + Sync {
    /// Fetches the daily series between `start` and `end`, both inclusive.
    ///
    /// A single attempt is made. Transport failures, timeouts and non-2xx
    /// statuses are errors; an unreadable body is an empty series.
    async fn fetch_daily_rates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRate>, ApiError>;
}

/// A concrete implementation of `RateIndexClient` for the Banco Central do
/// Brasil SGS API.
#[derive(Debug, Clone)]
pub struct BcbClient {
    client: reqwest::Client,
    base_url: String,
}

impl BcbClient {
    pub fn new(settings: &RateIndexSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self::with_client(client, settings.base_url.clone()))
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

/// The SGS API expects `dd/mm/yyyy`.
fn format_sgs_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[async_trait]
impl RateIndexClient for BcbClient {
    async fn fetch_daily_rates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRate>, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("formato", "json".to_string()),
                ("dataInicial", format_sgs_date(start)),
                ("dataFinal", format_sgs_date(end)),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status(format!("{status}: {text}")));
        }

        let series = parse_daily_rates(&text);
        tracing::info!(%start, %end, days = series.len(), "Fetched daily rate series.");
        Ok(series)
    }
}
