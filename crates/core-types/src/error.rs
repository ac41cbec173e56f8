use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The payload is missing a field or carries the wrong primitive type.
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// The payload is well-typed but breaks a business rule.
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    /// The requested interest-rate window is out of bounds.
    #[error("Invalid date window: {0}")]
    InvalidWindow(String),
}
