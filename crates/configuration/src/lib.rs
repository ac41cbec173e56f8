use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DatabaseSettings, FinancingSettings, LoggingSettings, RateIndexSettings, ServerSettings,
    StoreBackend,
};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// This function is the primary entry point for this crate. The file is
/// optional; environment variables prefixed with `APP__` override it, e.g.
/// `APP__SERVER__PORT=9000` or `APP__DATABASE__BACKEND=memory`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`], reading the file at `path` instead.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must be greater than 0".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    if config.rate_index.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "rate_index.timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_from(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.financing.interest_free_installments, 6);
        assert_eq!(
            config.rate_index.floor_date,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [server]
            port = 9100

            [database]
            backend = "memory"

            [rate_index]
            timeout_secs = 3
            floor_date = "2015-06-01"
            "#,
        );
        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.rate_index.timeout_secs, 3);
        assert_eq!(
            config.rate_index.floor_date,
            NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
        );
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let file = write_config("[database]\nmax_connections = 0\n");
        let result = load_config_from(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
