//! Market pulse poller.
//!
//! Fetches aggregated market statistics on a fixed interval. A failed poll
//! keeps the last good points and stats and only sets the error line.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tulip_api::PulseApi;
use tulip_core::{PulsePoint, PulseStats};
use tulip_telemetry::Metrics;

use crate::generation::Generation;
use crate::{LoadOutcome, LoadStatus};

/// Poll interval used when none is configured.
pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_millis(30_000);

pub const PULSE_ERROR_MESSAGE: &str = "Unable to load market pulse";

/// Observable pulse state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PulseState {
    pub points: Vec<PulsePoint>,
    pub stats: Option<PulseStats>,
    /// Buy-side share as a 0..=100 percentage.
    pub sentiment: Option<u8>,
    pub status: LoadStatus,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

struct PulseInner {
    api: Arc<dyn PulseApi>,
    state: watch::Sender<PulseState>,
    generation: Generation,
}

/// Market pulse store.
#[derive(Clone)]
pub struct MarketPulse {
    inner: Arc<PulseInner>,
}

impl MarketPulse {
    pub fn new(api: Arc<dyn PulseApi>) -> Self {
        let (state, _) = watch::channel(PulseState::default());
        Self {
            inner: Arc::new(PulseInner {
                api,
                state,
                generation: Generation::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> PulseState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PulseState> {
        self.inner.state.subscribe()
    }

    /// Fetch once, now.
    pub async fn refresh(&self) -> LoadOutcome {
        let ticket = self.inner.generation.begin();
        self.inner.state.send_if_modified(|s| {
            let changed = s.status != LoadStatus::Loading;
            s.status = LoadStatus::Loading;
            changed
        });

        let result = self.inner.api.fetch_pulse().await;

        if !self.inner.generation.is_current(ticket) {
            debug!(ticket, "Discarding superseded pulse response");
            Metrics::stale_response("pulse");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                Metrics::pulse_poll("ok");
                let sentiment = snapshot.stats.as_ref().map(PulseStats::buy_sentiment);
                debug!(points = snapshot.points.len(), ?sentiment, "Pulse refreshed");
                self.inner.state.send_modify(|s| {
                    s.points = snapshot.points;
                    s.stats = snapshot.stats;
                    s.sentiment = sentiment;
                    s.status = LoadStatus::Ready;
                    s.error = None;
                    s.updated_at = Some(Utc::now());
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                Metrics::pulse_poll("error");
                warn!(error = %e, "Market pulse poll failed");
                self.inner.state.send_modify(|s| {
                    s.status = LoadStatus::Error;
                    s.error = Some(PULSE_ERROR_MESSAGE.to_string());
                });
                LoadOutcome::Failed(PULSE_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// Drop a `Loading` status left by an abandoned poll, returning to
    /// whatever the last finished poll settled on.
    fn abandon_poll(&self) {
        self.inner.state.send_if_modified(|s| {
            if s.status != LoadStatus::Loading {
                return false;
            }
            s.status = if s.error.is_some() {
                LoadStatus::Error
            } else if s.updated_at.is_some() {
                LoadStatus::Ready
            } else {
                LoadStatus::Idle
            };
            true
        });
    }

    /// Start polling every `interval`, first poll immediately.
    pub fn spawn(&self, interval: Duration) -> PulseHandle {
        let token = CancellationToken::new();
        let pulse = self.clone();
        let cancel = token.clone();

        let task = tokio::spawn(async move {
            info!(interval_ms = interval.as_millis() as u64, "Market pulse polling started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                // A poll still in flight at shutdown must not write afterwards.
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        pulse.inner.generation.invalidate();
                        pulse.abandon_poll();
                        break;
                    }
                    _ = pulse.refresh() => {}
                }
            }
            info!("Market pulse polling stopped");
        });

        PulseHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owns a running poll loop. Dropping it stops the loop.
pub struct PulseHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PulseHandle {
    /// Stop polling and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Market pulse task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PulseHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
