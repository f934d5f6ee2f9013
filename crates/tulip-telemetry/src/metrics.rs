//! Prometheus metrics for the TulipBroker client.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught at first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_gauge, CounterVec, Encoder, IntGauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// API requests by endpoint and outcome (ok/error/unreachable).
pub static API_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tulip_api_requests_total",
        "Total API requests by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .unwrap()
});

/// Order submission attempts by backend and outcome (accepted/rejected/invalid).
pub static ORDER_SUBMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tulip_order_submissions_total",
        "Total order submission attempts",
        &["backend", "outcome"]
    )
    .unwrap()
});

/// Persona roster syncs by outcome (ready/fallback).
pub static PERSONA_SYNC_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tulip_persona_sync_total",
        "Total persona roster loads",
        &["outcome"]
    )
    .unwrap()
});

/// Market pulse polls by outcome (ok/error).
pub static PULSE_POLLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tulip_pulse_polls_total",
        "Total market pulse polls",
        &["outcome"]
    )
    .unwrap()
});

/// Responses discarded because a newer request superseded them.
pub static STALE_RESPONSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tulip_stale_responses_total",
        "Responses dropped by generation check",
        &["store"]
    )
    .unwrap()
});

/// Size of the recent orders list currently shown.
pub static RECENT_ORDERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("tulip_recent_orders", "Orders in the recent orders list").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn api_request(endpoint: &str, outcome: &str) {
        API_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
    }

    pub fn order_submission(backend: &str, outcome: &str) {
        ORDER_SUBMISSIONS_TOTAL
            .with_label_values(&[backend, outcome])
            .inc();
    }

    pub fn persona_sync(outcome: &str) {
        PERSONA_SYNC_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn pulse_poll(outcome: &str) {
        PULSE_POLLS_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn stale_response(store: &str) {
        STALE_RESPONSES_TOTAL.with_label_values(&[store]).inc();
    }

    pub fn recent_orders(count: usize) {
        RECENT_ORDERS.set(count as i64);
    }

    /// Render the default registry in the text exposition format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
