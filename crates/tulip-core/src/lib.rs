//! Core domain types for the TulipBroker client.
//!
//! This crate provides the types shared by the API client and the stores:
//! - `Persona`, `PersonaPayload`: selectable identities and their edit payloads
//! - `OrderRequest`, `OrderRecord`, `OrderAck`: order wire types
//! - `OrderSide`, `TimeInForce`, `OrdersBackend`: trading enums
//! - `IdempotencyKey`, `ClientOrderId`: per-attempt identifiers
//! - `PulsePoint`, `PulseStats`: market pulse payloads
//! - `avatar_data_url`: uploaded avatar images as data URLs

pub mod avatar;
pub mod backend;
pub mod error;
pub mod order;
pub mod persona;
pub mod types;

pub use avatar::{avatar_data_url, MAX_AVATAR_BYTES};
pub use backend::OrdersBackend;
pub use error::{CoreError, Result};
pub use order::{
    ClientOrderId, IdempotencyKey, OrderAck, OrderRecord, OrderRequest, OrderSide, TimeInForce,
};
pub use persona::{seed_personas, sort_personas, Persona, PersonaPayload, UNKNOWN_PERSONA_ID};
pub use types::{ApiConfig, PulsePoint, PulseSnapshot, PulseStats};
