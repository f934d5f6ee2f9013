//! TulipBroker terminal.
//!
//! Wires the client stores to a command-line surface:
//! - persona roster and the active persona
//! - order submission and recent orders per backend
//! - market pulse polling and the API status probe

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod render;

pub use app::{Application, ACTIVE_PERSONA_PREF_KEY};
pub use cli::Command;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
