//! Fake API implementations for store tests.
//!
//! Each fake records the calls it receives. Responses can be held back
//! behind a `Notify` gate to reproduce out-of-order completion.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Notify;
use tulip_api::{ApiError, ApiResult, ConfigApi, OrdersApi, PersonaApi, PulseApi};
use tulip_core::{
    ApiConfig, OrderAck, OrderRecord, OrderRequest, OrderSide, OrdersBackend, Persona,
    PersonaPayload, PulsePoint, PulseSnapshot, PulseStats,
};

/// How a scripted call should fail.
#[derive(Debug, Clone)]
pub enum Failure {
    Unreachable,
    Status(u16, String),
}

impl Failure {
    pub fn to_error(&self, endpoint: &'static str) -> ApiError {
        match self {
            Self::Unreachable => ApiError::Unreachable {
                endpoint,
                reason: "connection refused".to_string(),
            },
            Self::Status(status, message) => ApiError::Status {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

/// Let spawned tasks run up to their next await point.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Personas
// ============================================================================

/// One scripted `list_personas` response.
pub struct ListStep {
    pub gate: Option<Arc<Notify>>,
    pub result: Result<Vec<Persona>, Failure>,
}

#[derive(Default)]
pub struct FakePersonaApi {
    roster: Mutex<Vec<Persona>>,
    list_script: Mutex<VecDeque<ListStep>>,
    failure: Mutex<Option<Failure>>,
    next_id: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakePersonaApi {
    pub fn with_roster(roster: Vec<Persona>) -> Arc<Self> {
        let api = Self::default();
        *api.roster.lock() = roster;
        Arc::new(api)
    }

    /// Queue a list response; unscripted calls return the roster.
    pub fn script_list(&self, gate: Option<Arc<Notify>>, result: Result<Vec<Persona>, Failure>) {
        self.list_script.lock().push_back(ListStep { gate, result });
    }

    /// Make every mutating call fail until cleared.
    pub fn fail_writes(&self, failure: Option<Failure>) {
        *self.failure.lock() = failure;
    }

    pub fn roster(&self) -> Vec<Persona> {
        self.roster.lock().clone()
    }

    fn write_failure(&self, endpoint: &'static str) -> ApiResult<()> {
        match self.failure.lock().as_ref() {
            Some(f) => Err(f.to_error(endpoint)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PersonaApi for FakePersonaApi {
    async fn list_personas(&self) -> ApiResult<Vec<Persona>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.list_script.lock().pop_front();
        match step {
            Some(step) => {
                if let Some(gate) = step.gate {
                    gate.notified().await;
                }
                step.result.map_err(|f| f.to_error("personas"))
            }
            None => Ok(self.roster()),
        }
    }

    async fn create_persona(&self, payload: &PersonaPayload) -> ApiResult<Persona> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.write_failure("personas")?;

        let user_id = payload.user_id.clone().unwrap_or_else(|| {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            format!("user-{n}")
        });
        let mut persona = Persona::new(user_id, payload.user_name.clone());
        persona.bio = payload.bio.clone().unwrap_or_default();
        persona.avatar_url = payload.avatar_url.clone().unwrap_or_default();
        self.roster.lock().push(persona.clone());
        Ok(persona)
    }

    async fn update_persona(&self, user_id: &str, payload: &PersonaPayload) -> ApiResult<Persona> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.write_failure("personas")?;

        let mut roster = self.roster.lock();
        let Some(existing) = roster.iter_mut().find(|p| p.user_id == user_id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "Persona not found".to_string(),
            });
        };
        existing.user_name = payload.user_name.clone();
        if let Some(bio) = &payload.bio {
            existing.bio = bio.clone();
        }
        if let Some(avatar_url) = &payload.avatar_url {
            existing.avatar_url = avatar_url.clone();
        }
        Ok(existing.clone())
    }

    async fn delete_persona(&self, user_id: &str) -> ApiResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.write_failure("personas")?;
        self.roster.lock().retain(|p| p.user_id != user_id);
        Ok(())
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Default)]
pub struct FakeOrdersApi {
    stored: Mutex<HashMap<OrdersBackend, Vec<OrderRecord>>>,
    created: Mutex<Vec<(OrdersBackend, OrderRequest)>>,
    listed: Mutex<Vec<(OrdersBackend, usize)>>,
    create_failure: Mutex<Option<Failure>>,
    list_failure: Mutex<Option<Failure>>,
    list_gates: Mutex<VecDeque<Arc<Notify>>>,
    next_id: AtomicUsize,
}

impl FakeOrdersApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, backend: OrdersBackend, records: Vec<OrderRecord>) {
        self.stored.lock().insert(backend, records);
    }

    pub fn fail_create(&self, failure: Option<Failure>) {
        *self.create_failure.lock() = failure;
    }

    pub fn fail_list(&self, failure: Option<Failure>) {
        *self.list_failure.lock() = failure;
    }

    /// Hold the next list call until `gate` is notified.
    pub fn gate_next_list(&self, gate: Arc<Notify>) {
        self.list_gates.lock().push_back(gate);
    }

    pub fn created(&self) -> Vec<(OrdersBackend, OrderRequest)> {
        self.created.lock().clone()
    }

    pub fn listed(&self) -> Vec<(OrdersBackend, usize)> {
        self.listed.lock().clone()
    }

    pub fn create_count(&self) -> usize {
        self.created.lock().len()
    }
}

#[async_trait]
impl OrdersApi for FakeOrdersApi {
    async fn list_orders(&self, backend: OrdersBackend, limit: usize) -> ApiResult<Vec<OrderRecord>> {
        self.listed.lock().push((backend, limit));
        let gate = self.list_gates.lock().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(f) = self.list_failure.lock().as_ref() {
            return Err(f.to_error("orders"));
        }
        Ok(self.stored.lock().get(&backend).cloned().unwrap_or_default())
    }

    async fn create_order(&self, backend: OrdersBackend, order: &OrderRequest) -> ApiResult<OrderAck> {
        self.created.lock().push((backend, order.clone()));
        if let Some(f) = self.create_failure.lock().as_ref() {
            return Err(f.to_error("orders"));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let accepted_at = Utc.timestamp_opt(1_700_000_000 + n as i64, 0).single();
        let order_id = format!("ord-{n}");
        self.stored.lock().entry(backend).or_default().push(OrderRecord {
            order_id: order_id.clone(),
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            status: Some("ACCEPTED".to_string()),
            accepted_at,
            region: Some("eu-west-1".to_string()),
            processing_ms: Some(4.0),
            user_id: Some(order.user_id.clone()),
        });

        Ok(OrderAck {
            order_id,
            status: Some("ACCEPTED".to_string()),
            accepted_at,
            region: Some("eu-west-1".to_string()),
            processing_ms: Some(4.0),
        })
    }
}

pub fn record(order_id: &str, side: OrderSide, price: Decimal, secs: i64) -> OrderRecord {
    OrderRecord {
        order_id: order_id.to_string(),
        side,
        price,
        quantity: 1,
        status: Some("ACCEPTED".to_string()),
        accepted_at: Utc.timestamp_opt(secs, 0).single(),
        region: None,
        processing_ms: None,
        user_id: None,
    }
}

// ============================================================================
// Pulse and config
// ============================================================================

#[derive(Default)]
pub struct FakePulseApi {
    script: Mutex<VecDeque<Result<PulseSnapshot, Failure>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub calls: AtomicUsize,
}

impl FakePulseApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, result: Result<PulseSnapshot, Failure>) {
        self.script.lock().push_back(result);
    }

    /// Hold every fetch until `gate` is notified.
    pub fn set_gate(&self, gate: Option<Arc<Notify>>) {
        *self.gate.lock() = gate;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PulseApi for FakePulseApi {
    async fn fetch_pulse(&self) -> ApiResult<PulseSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let next = self.script.lock().pop_front();
        match next {
            Some(result) => result.map_err(|f| f.to_error("pulse")),
            None => Ok(PulseSnapshot::default()),
        }
    }
}

pub fn pulse(buy_share: f64, last_price: f64) -> PulseSnapshot {
    PulseSnapshot {
        points: vec![PulsePoint {
            ts: "2024-01-01T00:00:00Z".to_string(),
            avg_price: last_price,
            buy_orders: 6,
            sell_orders: 4,
        }],
        stats: Some(PulseStats {
            last_price,
            buy_share,
            sell_share: 1.0 - buy_share,
            orders_sampled: 10,
        }),
    }
}

pub struct FakeConfigApi {
    result: Result<ApiConfig, Failure>,
    pub calls: AtomicUsize,
}

impl FakeConfigApi {
    pub fn ok(config: ApiConfig) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(config),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(failure: Failure) -> Arc<Self> {
        Arc::new(Self {
            result: Err(failure),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ConfigApi for FakeConfigApi {
    async fn fetch_config(&self) -> ApiResult<ApiConfig> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|f| f.to_error("config"))
    }
}
