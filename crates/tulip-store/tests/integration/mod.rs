//! Integration tests for tulip-store.
//!
//! Stores are driven against in-memory fakes of the API seams:
//! - persona roster CRUD and load ordering
//! - order submission and backend-scoped listing
//! - pulse polling and the config probe

pub mod common;
