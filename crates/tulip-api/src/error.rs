//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (DNS, connect, timeout).
    #[error("{endpoint} unreachable: {reason}")]
    Unreachable {
        endpoint: &'static str,
        reason: String,
    },

    /// Non-2xx response. `message` is already user-facing.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ApiError {
    /// Short message suitable for an inline error badge.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable { .. } => "API unreachable".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode { .. } => "Unexpected response from API".to_string(),
            Self::InvalidUrl(_) | Self::HttpClient(_) => self.to_string(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
