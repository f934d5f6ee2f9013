//! Trait seams between the stores and the transport.

use async_trait::async_trait;
use tulip_core::{
    ApiConfig, OrderAck, OrderRecord, OrderRequest, OrdersBackend, Persona, PersonaPayload,
    PulseSnapshot,
};

use crate::error::ApiResult;

/// Remote persona roster.
#[async_trait]
pub trait PersonaApi: Send + Sync {
    async fn list_personas(&self) -> ApiResult<Vec<Persona>>;

    async fn create_persona(&self, payload: &PersonaPayload) -> ApiResult<Persona>;

    async fn update_persona(&self, user_id: &str, payload: &PersonaPayload) -> ApiResult<Persona>;

    async fn delete_persona(&self, user_id: &str) -> ApiResult<()>;
}

/// Order creation and listing, scoped to a backend.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn list_orders(&self, backend: OrdersBackend, limit: usize) -> ApiResult<Vec<OrderRecord>>;

    async fn create_order(&self, backend: OrdersBackend, order: &OrderRequest) -> ApiResult<OrderAck>;
}

#[async_trait]
pub trait PulseApi: Send + Sync {
    async fn fetch_pulse(&self) -> ApiResult<PulseSnapshot>;
}

#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn fetch_config(&self) -> ApiResult<ApiConfig>;
}
