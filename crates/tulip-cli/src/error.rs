//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] tulip_api::ApiError),

    #[error("{}", .0.user_message())]
    Store(#[from] tulip_store::StoreError),

    #[error("Invalid value: {0}")]
    Core(#[from] tulip_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tulip_telemetry::TelemetryError),

    /// Failure already phrased by a store for display.
    #[error("{0}")]
    Rejected(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("{0}")]
    Offline(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
