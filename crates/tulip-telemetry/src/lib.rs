//! Prometheus metrics and structured logging for the TulipBroker client.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for API calls, order submissions and pulse polling

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
