//! Orders backend preference.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use tulip_core::OrdersBackend;

use crate::prefs::PreferenceStore;

/// Preference key holding the selected backend.
pub const BACKEND_PREF_KEY: &str = "tb-orders-backend";

struct SelectorInner {
    prefs: Arc<dyn PreferenceStore>,
    state: watch::Sender<OrdersBackend>,
}

/// Holds which data store order operations are routed to.
#[derive(Clone)]
pub struct BackendSelector {
    inner: Arc<SelectorInner>,
}

impl BackendSelector {
    /// Restore the persisted selection, defaulting on unknown values.
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let stored = prefs.get(BACKEND_PREF_KEY);
        let backend = OrdersBackend::from_persisted(stored.as_deref());
        if let Some(raw) = stored.as_deref() {
            if raw != backend.as_str() {
                warn!(value = raw, fallback = %backend, "Unrecognized persisted orders backend");
            }
        }

        let (state, _) = watch::channel(backend);
        Self {
            inner: Arc::new(SelectorInner { prefs, state }),
        }
    }

    pub fn get(&self) -> OrdersBackend {
        *self.inner.state.borrow()
    }

    /// Select `backend`. Returns `true` if the selection changed.
    ///
    /// A failed write is logged; the in-memory selection still applies.
    pub fn set(&self, backend: OrdersBackend) -> bool {
        let changed = self.inner.state.send_if_modified(|current| {
            if *current == backend {
                false
            } else {
                *current = backend;
                true
            }
        });

        if let Err(e) = self.inner.prefs.set(BACKEND_PREF_KEY, backend.as_str()) {
            error!(error = %e, %backend, "Failed to persist orders backend");
        }

        if changed {
            info!(%backend, "Orders backend selected");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<OrdersBackend> {
        self.inner.state.subscribe()
    }
}
