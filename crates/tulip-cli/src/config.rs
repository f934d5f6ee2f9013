//! Application configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use tulip_core::{seed_personas, Persona, TimeInForce};
use tulip_store::OrderDeskConfig;

use crate::error::{AppError, AppResult};

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "TULIP_API_URL";

/// Terminal configuration, read from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the TulipBroker API. Without it only local commands work.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request timeout (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Number of recent orders shown. Default: 20.
    #[serde(default = "default_orders_limit")]
    pub orders_limit: usize,
    /// Time-in-force attached to every order. Default: GTC.
    #[serde(default)]
    pub time_in_force: TimeInForce,
    /// Market pulse poll interval (ms). Default: 30,000.
    #[serde(default = "default_pulse_interval_ms")]
    pub pulse_interval_ms: u64,
    /// JSON file holding persisted preferences.
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,
    /// Optional JSON array of personas replacing the built-in seeds.
    #[serde(default)]
    pub seed_personas_path: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_orders_limit() -> usize {
    20
}

fn default_pulse_interval_ms() -> u64 {
    30_000
}

fn default_preferences_path() -> String {
    ".tulip/preferences.json".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            orders_limit: default_orders_limit(),
            time_in_force: TimeInForce::default(),
            pulse_interval_ms: default_pulse_interval_ms(),
            preferences_path: default_preferences_path(),
            seed_personas_path: None,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn from_file(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, then apply `TULIP_API_URL`.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = Self::from_file(path)?;
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    /// Replace `api_url` when `url` is non-blank.
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.api_url = Some(url);
        }
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.orders_limit == 0 {
            return Err(AppError::Config("orders_limit must be positive".to_string()));
        }
        if self.pulse_interval_ms == 0 {
            return Err(AppError::Config("pulse_interval_ms must be positive".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Configured API URL, if any non-blank value is set.
    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms)
    }

    pub fn order_desk(&self) -> OrderDeskConfig {
        OrderDeskConfig {
            limit: self.orders_limit,
            time_in_force: self.time_in_force,
        }
    }

    /// Seed roster: the configured file if set, else the built-in personas.
    pub fn seed_personas(&self) -> AppResult<Vec<Persona>> {
        let Some(path) = self.seed_personas_path.as_deref() else {
            return Ok(seed_personas());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read seed personas {path}: {e}")))?;
        let personas: Vec<Persona> = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse seed personas {path}: {e}")))?;

        if personas.is_empty() {
            warn!(path, "Seed persona file is empty, using built-in seeds");
            return Ok(seed_personas());
        }
        Ok(personas)
    }
}
