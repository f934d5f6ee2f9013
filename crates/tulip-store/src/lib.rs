//! Client-side stores for the TulipBroker terminal.
//!
//! Each store is a cheap `Clone` handle over state it owns exclusively.
//! State changes are published through `tokio::sync::watch`, so views
//! subscribe instead of polling. Responses that resolve after a newer
//! request for the same resource are discarded via a per-store
//! [`Generation`] counter.
//!
//! ```text
//!   PersonaStore ──active persona──┐
//!                                  ▼
//!   BackendSelector ──backend──▶ OrderDesk ──▶ OrdersApi
//!          │
//!   PreferenceStore (tb-orders-backend)
//!
//!   MarketPulse ──interval──▶ PulseApi        ApiStatus ──▶ ConfigApi
//! ```

pub mod backend;
pub mod error;
pub mod generation;
pub mod orders;
pub mod persona;
pub mod prefs;
pub mod pulse;
pub mod status;

pub use backend::{BackendSelector, BACKEND_PREF_KEY};
pub use error::{StoreError, StoreResult};
pub use generation::Generation;
pub use orders::{
    DeskSnapshot, OrderDesk, OrderDeskConfig, OrderDraft, SubmitState, GENERIC_SUBMIT_ERROR,
    INVALID_ORDER_MESSAGE, UNREACHABLE_SUBMIT_ERROR,
};
pub use persona::{PersonaSnapshot, PersonaStore};
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use pulse::{MarketPulse, PulseHandle, PulseState, DEFAULT_PULSE_INTERVAL, PULSE_ERROR_MESSAGE};
pub use status::{ApiStatus, ApiStatusState, API_UNREACHABLE_MESSAGE, MISSING_API_URL_MESSAGE};

use serde::Serialize;

/// Lifecycle of a remote-backed piece of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// How a fetch settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Result committed to the store.
    Applied,
    /// Request failed; the store fell back and recorded this message.
    Failed(String),
    /// A newer request superseded this one; its result was dropped.
    Stale,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
