//! Error types for tulip-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid persona: {0}")]
    InvalidPersona(String),

    #[error("{0}")]
    InvalidAvatar(String),

    #[error("Unknown orders backend: {0}")]
    UnknownBackend(String),

    #[error("Unknown order side: {0}")]
    UnknownSide(String),

    #[error("Unknown time in force: {0}")]
    UnknownTimeInForce(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
