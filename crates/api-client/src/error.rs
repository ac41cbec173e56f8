use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, timeout, TLS, or an unreadable response stream.
    #[error("Rate index request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The index answered with a non-2xx status.
    #[error("Rate index answered {0}")]
    Status(String),

    /// The series was read but cannot be used, e.g. its sum overflows.
    #[error("Rate index returned an unusable series: {0}")]
    InvalidSeries(String),
}
