//! Orders backend selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Downstream data store that services order requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdersBackend {
    #[default]
    #[serde(rename = "dynamodb")]
    DynamoDb,
    Yugabyte,
}

impl OrdersBackend {
    pub const ALL: [OrdersBackend; 2] = [OrdersBackend::DynamoDb, OrdersBackend::Yugabyte];

    /// Value used in `?backend=` and in persisted preferences.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DynamoDb => "dynamodb",
            Self::Yugabyte => "yugabyte",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DynamoDb => "DynamoDB",
            Self::Yugabyte => "YugabyteDB",
        }
    }

    /// Decode a persisted value, falling back to the default variant.
    pub fn from_persisted(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for OrdersBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrdersBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dynamodb" => Ok(Self::DynamoDb),
            "yugabyte" => Ok(Self::Yugabyte),
            other => Err(CoreError::UnknownBackend(other.to_string())),
        }
    }
}
