use chrono::NaiveDate;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `config.toml` still yields a
/// runnable service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_index: RateIndexSettings,
    pub financing: FinancingSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Which storage engine backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL, reached through `DATABASE_URL`.
    #[default]
    Postgres,
    /// A process-local store. Nothing survives a restart.
    Memory,
}

/// Connection pool parameters. The URL itself comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    /// 1 reproduces a single shared connection.
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

/// The external daily interest-rate series (BCB SGS series 11, SELIC).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateIndexSettings {
    pub base_url: String,
    /// Upper bound on the single outbound request.
    pub timeout_secs: u64,
    /// Earliest start date a caller may ask for.
    pub floor_date: NaiveDate,
}

impl RateIndexSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RateIndexSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.bcb.gov.br/dados/serie/bcdata.sgs.11/dados".to_string(),
            timeout_secs: 10,
            floor_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
        }
    }
}

/// Parameters of the installment calculation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinancingSettings {
    /// Purchases with this many installments or fewer carry no interest.
    pub interest_free_installments: u32,
}

impl Default for FinancingSettings {
    fn default() -> Self {
        Self {
            interest_free_installments: 6,
        }
    }
}

/// Optional file logging on top of stdout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// When set, a daily-rotated log file is written here as well.
    pub directory: Option<String>,
}
