//! API reachability probe backed by `GET /api/config`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use tulip_api::ConfigApi;
use tulip_core::ApiConfig;

use crate::LoadStatus;

pub const MISSING_API_URL_MESSAGE: &str = "Set TULIP_API_URL to enable API checks";

pub const API_UNREACHABLE_MESSAGE: &str = "API unreachable";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiStatusState {
    pub config: Option<ApiConfig>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

/// Loads the API build/deploy info once.
#[derive(Clone)]
pub struct ApiStatus {
    api: Option<Arc<dyn ConfigApi>>,
    state: Arc<watch::Sender<ApiStatusState>>,
}

impl ApiStatus {
    /// `api` is `None` when no base URL is configured.
    pub fn new(api: Option<Arc<dyn ConfigApi>>) -> Self {
        let (state, _) = watch::channel(ApiStatusState::default());
        Self {
            api,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ApiStatusState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApiStatusState> {
        self.state.subscribe()
    }

    pub async fn load(&self) -> ApiStatusState {
        let Some(api) = self.api.as_ref() else {
            self.state.send_modify(|s| {
                s.config = None;
                s.status = LoadStatus::Error;
                s.error = Some(MISSING_API_URL_MESSAGE.to_string());
            });
            return self.snapshot();
        };

        self.state.send_modify(|s| s.status = LoadStatus::Loading);

        match api.fetch_config().await {
            Ok(config) => {
                info!(
                    version = config.version.as_deref().unwrap_or("-"),
                    env = config.env.as_deref().unwrap_or("-"),
                    "API reachable"
                );
                self.state.send_modify(|s| {
                    s.config = Some(config);
                    s.status = LoadStatus::Ready;
                    s.error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "API status check failed");
                self.state.send_modify(|s| {
                    s.status = LoadStatus::Error;
                    s.error = Some(API_UNREACHABLE_MESSAGE.to_string());
                });
            }
        }
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_reports_without_request() {
        let status = ApiStatus::new(None);
        let state = status.load().await;
        assert_eq!(state.status, LoadStatus::Error);
        assert_eq!(state.error.as_deref(), Some(MISSING_API_URL_MESSAGE));
        assert!(state.config.is_none());
    }
}
