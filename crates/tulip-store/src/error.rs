//! Store error types.

use thiserror::Error;
use tulip_api::ApiError;
use tulip_core::CoreError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Local validation failure. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Preference storage error: {0}")]
    Preferences(String),
}

impl StoreError {
    /// Message for an inline error line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Api(e) => e.user_message(),
            Self::Preferences(_) => self.to_string(),
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPersona(msg)
            | CoreError::InvalidPrice(msg)
            | CoreError::InvalidQuantity(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
