//! Order desk: form state to order request, plus the recent orders list.
//!
//! Submission and list refresh have independent sub-states. A submission is
//! never retried automatically and is never inserted optimistically; the
//! list only changes by re-fetching after the server confirms.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tulip_api::{ApiError, OrdersApi};
use tulip_core::{OrderAck, OrderRecord, OrderRequest, OrderSide, OrdersBackend, TimeInForce};
use tulip_telemetry::Metrics;

use crate::backend::BackendSelector;
use crate::error::{StoreError, StoreResult};
use crate::generation::Generation;
use crate::persona::PersonaStore;
use crate::{LoadOutcome, LoadStatus};

/// Shown when price or quantity cannot be parsed.
pub const INVALID_ORDER_MESSAGE: &str = "Enter a valid price and quantity before submitting.";

/// Shown when a submission fails without a usable server message.
pub const GENERIC_SUBMIT_ERROR: &str = "Failed to submit order";

pub const UNREACHABLE_SUBMIT_ERROR: &str = "Orders API unreachable. Check your connection and resubmit.";

/// Order desk settings.
#[derive(Debug, Clone)]
pub struct OrderDeskConfig {
    /// Size of the recent orders list.
    pub limit: usize,
    pub time_in_force: TimeInForce,
}

impl Default for OrderDeskConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            time_in_force: TimeInForce::GoodTilCancelled,
        }
    }
}

/// Raw form input, kept as typed so a failed submit can be retried as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub side: OrderSide,
    pub price: String,
    pub quantity: String,
}

impl OrderDraft {
    /// Parse into `(price, quantity)`; both must be positive.
    pub fn parse(&self) -> Option<(Decimal, u64)> {
        let price = Decimal::from_str(self.price.trim()).ok()?;
        let quantity = self.quantity.trim().parse::<u64>().ok()?;
        if price <= Decimal::ZERO || quantity == 0 {
            return None;
        }
        Some((price, quantity))
    }

    fn clear_amounts(&mut self) {
        self.price.clear();
        self.quantity.clear();
    }
}

/// Outcome of the latest submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Accepted(OrderAck),
    Failed(String),
}

/// Observable desk state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskSnapshot {
    pub draft: OrderDraft,
    pub submit: SubmitState,
    /// Newest first, at most `limit` entries.
    pub orders: Vec<OrderRecord>,
    /// Backend the list was fetched from.
    pub orders_backend: OrdersBackend,
    pub orders_status: LoadStatus,
    pub orders_error: Option<String>,
}

struct DeskInner {
    api: Arc<dyn OrdersApi>,
    personas: PersonaStore,
    backend: BackendSelector,
    config: OrderDeskConfig,
    state: watch::Sender<DeskSnapshot>,
    list_generation: Generation,
}

/// Order submission client.
#[derive(Clone)]
pub struct OrderDesk {
    inner: Arc<DeskInner>,
}

impl OrderDesk {
    pub fn new(
        api: Arc<dyn OrdersApi>,
        personas: PersonaStore,
        backend: BackendSelector,
        config: OrderDeskConfig,
    ) -> Self {
        let (state, _) = watch::channel(DeskSnapshot {
            draft: OrderDraft::default(),
            submit: SubmitState::Idle,
            orders: Vec::new(),
            orders_backend: backend.get(),
            orders_status: LoadStatus::Idle,
            orders_error: None,
        });

        Self {
            inner: Arc::new(DeskInner {
                api,
                personas,
                backend,
                config,
                state,
                list_generation: Generation::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> DeskSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeskSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn backend(&self) -> OrdersBackend {
        self.inner.backend.get()
    }

    pub fn set_draft(&self, side: OrderSide, price: &str, quantity: &str) {
        self.inner.state.send_modify(|s| {
            s.draft = OrderDraft {
                side,
                price: price.to_string(),
                quantity: quantity.to_string(),
            };
        });
    }

    /// Submit an order from raw form input.
    pub async fn submit(&self, side: OrderSide, price: &str, quantity: &str) -> StoreResult<OrderAck> {
        self.set_draft(side, price, quantity);
        self.submit_draft().await
    }

    /// Submit the current draft.
    ///
    /// Invalid input fails locally without a request. On success the price
    /// and quantity are cleared and the list is refreshed; on failure the
    /// draft is kept for a manual retry.
    pub async fn submit_draft(&self) -> StoreResult<OrderAck> {
        let draft = self.inner.state.borrow().draft.clone();
        let backend = self.inner.backend.get();

        let Some((price, quantity)) = draft.parse() else {
            debug!(price = %draft.price, quantity = %draft.quantity, "Rejected order input");
            Metrics::order_submission(backend.as_str(), "invalid");
            self.inner.state.send_modify(|s| {
                s.submit = SubmitState::Failed(INVALID_ORDER_MESSAGE.to_string());
            });
            return Err(StoreError::Validation(INVALID_ORDER_MESSAGE.to_string()));
        };

        let persona = self.inner.personas.active_persona();
        let request = OrderRequest::new(
            persona.user_id,
            draft.side,
            price,
            quantity,
            self.inner.config.time_in_force,
        );

        self.inner.state.send_modify(|s| s.submit = SubmitState::Submitting);

        match self.inner.api.create_order(backend, &request).await {
            Ok(ack) => {
                Metrics::order_submission(backend.as_str(), "accepted");
                info!(
                    order_id = %ack.order_id,
                    idempotency_key = %request.idempotency_key,
                    %backend,
                    "Order submitted"
                );
                self.inner.state.send_modify(|s| {
                    s.draft.clear_amounts();
                    s.submit = SubmitState::Accepted(ack.clone());
                });
                self.refresh().await;
                Ok(ack)
            }
            Err(e) => {
                Metrics::order_submission(backend.as_str(), "rejected");
                let message = submit_error_message(&e);
                warn!(
                    error = %e,
                    idempotency_key = %request.idempotency_key,
                    %backend,
                    "Order submission failed"
                );
                self.inner.state.send_modify(|s| s.submit = SubmitState::Failed(message));
                Err(e.into())
            }
        }
    }

    /// Re-fetch the most recent orders for the selected backend.
    pub async fn refresh(&self) -> LoadOutcome {
        let ticket = self.inner.list_generation.begin();
        let backend = self.inner.backend.get();
        self.inner.state.send_modify(|s| {
            s.orders_status = LoadStatus::Loading;
            s.orders_error = None;
        });

        let result = self.inner.api.list_orders(backend, self.inner.config.limit).await;

        if !self.inner.list_generation.is_current(ticket) {
            debug!(ticket, %backend, "Discarding superseded orders response");
            Metrics::stale_response("orders");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(mut orders) => {
                OrderRecord::sort_newest_first(&mut orders);
                orders.truncate(self.inner.config.limit);
                Metrics::recent_orders(orders.len());
                debug!(%backend, count = orders.len(), "Recent orders refreshed");
                self.inner.state.send_modify(|s| {
                    s.orders = orders;
                    s.orders_backend = backend;
                    s.orders_status = LoadStatus::Ready;
                    s.orders_error = None;
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, %backend, "Failed to load recent orders");
                self.inner.state.send_modify(|s| {
                    s.orders_status = LoadStatus::Error;
                    s.orders_error = Some(message.clone());
                });
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Route orders to `backend`.
    ///
    /// When the selection changes the list is cleared at once, in-flight
    /// refreshes are invalidated and a single refresh for the new backend
    /// runs. Returns `None` when the selection was already `backend`.
    pub async fn select_backend(&self, backend: OrdersBackend) -> Option<LoadOutcome> {
        if !self.inner.backend.set(backend) {
            return None;
        }

        self.inner.list_generation.invalidate();
        self.inner.state.send_modify(|s| {
            s.orders.clear();
            s.orders_backend = backend;
            s.orders_status = LoadStatus::Idle;
            s.orders_error = None;
        });
        Metrics::recent_orders(0);

        Some(self.refresh().await)
    }
}

fn submit_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        ApiError::Unreachable { .. } => UNREACHABLE_SUBMIT_ERROR.to_string(),
        _ => GENERIC_SUBMIT_ERROR.to_string(),
    }
}
