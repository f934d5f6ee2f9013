//! HTTP client for the TulipBroker REST API.
//!
//! `TulipClient` talks JSON to the backend; the `PersonaApi`, `OrdersApi`,
//! `PulseApi` and `ConfigApi` traits are the seams the stores depend on so
//! they can run against in-memory fakes.

pub mod api;
pub mod client;
pub mod error;

pub use api::{ConfigApi, OrdersApi, PersonaApi, PulseApi};
pub use client::{TulipClient, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
