//! HTTP client for the TulipBroker REST API.
//!
//! All endpoints hang off a configurable base URL:
//! - `GET /api/config`
//! - `GET|POST /api/personas`, `PUT|DELETE /api/personas/{userId}`
//! - `GET /api/orders?limit=N&backend=..`, `POST /api/orders?backend=..`
//! - `GET /api/metrics/pulse`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tulip_core::{
    ApiConfig, OrderAck, OrderRecord, OrderRequest, OrdersBackend, Persona, PersonaPayload,
    PulseSnapshot,
};
use tulip_telemetry::Metrics;

use crate::api::{ConfigApi, OrdersApi, PersonaApi, PulseApi};
use crate::error::{ApiError, ApiResult};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CONFIG_PATH: &str = "/api/config";
const PERSONAS_PATH: &str = "/api/personas";
const ORDERS_PATH: &str = "/api/orders";
const PULSE_PATH: &str = "/api/metrics/pulse";

/// `{ items: [...] }` list envelope.
#[derive(Debug, Deserialize)]
struct Items<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Client for the TulipBroker REST API.
#[derive(Debug, Clone)]
pub struct TulipClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash (e.g., "https://api.tulipbroker.dev").
    base_url: String,
}

impl TulipClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API origin, optionally with a path prefix. A trailing slash is ignored.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::InvalidUrl("base URL is empty".to_string()));
        }
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// `/api/personas/{userId}` with the id percent-encoded as one segment.
    fn persona_url(&self, user_id: &str) -> ApiResult<Url> {
        let mut url = self.url(PERSONAS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .push(user_id);
        Ok(url)
    }

    async fn send(&self, endpoint: &'static str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            Metrics::api_request(endpoint, "unreachable");
            warn!(endpoint, error = %e, "API request failed before a response");
            ApiError::Unreachable {
                endpoint,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            Metrics::api_request(endpoint, "error");
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            debug!(endpoint, %status, %message, "API returned an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Metrics::api_request(endpoint, "ok");
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }

    /// Fetch deployment metadata.
    pub async fn fetch_config(&self) -> ApiResult<ApiConfig> {
        let url = self.url(CONFIG_PATH)?;
        let response = self.send("config", self.client.get(url)).await?;
        Self::decode("config", response).await
    }

    /// Fetch the persona roster.
    pub async fn list_personas(&self) -> ApiResult<Vec<Persona>> {
        let url = self.url(PERSONAS_PATH)?;
        let request = self.client.get(url).header("Accept", "application/json");
        let response = self.send("personas", request).await?;
        let payload: Items<Persona> = Self::decode("personas", response).await?;
        debug!(count = payload.items.len(), "Fetched personas");
        Ok(payload.items)
    }

    pub async fn create_persona(&self, payload: &PersonaPayload) -> ApiResult<Persona> {
        let url = self.url(PERSONAS_PATH)?;
        let response = self.send("personas", self.client.post(url).json(payload)).await?;
        let created: Persona = Self::decode("personas", response).await?;
        info!(user_id = %created.user_id, "Persona created");
        Ok(created)
    }

    pub async fn update_persona(&self, user_id: &str, payload: &PersonaPayload) -> ApiResult<Persona> {
        let url = self.persona_url(user_id)?;
        let response = self.send("personas", self.client.put(url).json(payload)).await?;
        let updated: Persona = Self::decode("personas", response).await?;
        info!(user_id = %updated.user_id, "Persona updated");
        Ok(updated)
    }

    /// Delete a persona. Any 2xx (including 204 with no body) is success.
    pub async fn delete_persona(&self, user_id: &str) -> ApiResult<()> {
        let url = self.persona_url(user_id)?;
        self.send("personas", self.client.delete(url)).await?;
        info!(user_id, "Persona deleted");
        Ok(())
    }

    /// Fetch the most recent orders for `backend`.
    pub async fn list_orders(&self, backend: OrdersBackend, limit: usize) -> ApiResult<Vec<OrderRecord>> {
        let url = self.url(ORDERS_PATH)?;
        let request = self
            .client
            .get(url)
            .query(&[("limit", limit.to_string()), ("backend", backend.to_string())]);
        let response = self.send("orders", request).await?;
        let payload: Items<OrderRecord> = Self::decode("orders", response).await?;
        debug!(%backend, count = payload.items.len(), "Fetched orders");
        Ok(payload.items)
    }

    /// Submit an order to `backend`.
    pub async fn create_order(&self, backend: OrdersBackend, order: &OrderRequest) -> ApiResult<OrderAck> {
        let url = self.url(ORDERS_PATH)?;
        let request = self
            .client
            .post(url)
            .query(&[("backend", backend.as_str())])
            .json(order);

        info!(
            %backend,
            client_id = %order.client_id,
            idempotency_key = %order.idempotency_key,
            side = %order.side,
            price = %order.price,
            quantity = order.quantity,
            "Submitting order"
        );

        let response = self.send("orders", request).await?;
        let ack: OrderAck = Self::decode("orders", response).await?;
        info!(order_id = %ack.order_id, status = ?ack.status, "Order accepted");
        Ok(ack)
    }

    /// Fetch the aggregated market pulse.
    pub async fn fetch_pulse(&self) -> ApiResult<PulseSnapshot> {
        let url = self.url(PULSE_PATH)?;
        let response = self.send("pulse", self.client.get(url)).await?;
        Self::decode("pulse", response).await
    }
}

/// Extract a user-facing message from an error response body.
///
/// Prefers a string `error` field in a JSON body. A body that is not JSON
/// falls back to the status reason phrase; otherwise `Request failed (code)`.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let generic = || format!("Request failed ({})", status.as_u16());
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(generic),
        Err(_) => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(generic),
    }
}

#[async_trait]
impl PersonaApi for TulipClient {
    async fn list_personas(&self) -> ApiResult<Vec<Persona>> {
        TulipClient::list_personas(self).await
    }

    async fn create_persona(&self, payload: &PersonaPayload) -> ApiResult<Persona> {
        TulipClient::create_persona(self, payload).await
    }

    async fn update_persona(&self, user_id: &str, payload: &PersonaPayload) -> ApiResult<Persona> {
        TulipClient::update_persona(self, user_id, payload).await
    }

    async fn delete_persona(&self, user_id: &str) -> ApiResult<()> {
        TulipClient::delete_persona(self, user_id).await
    }
}

#[async_trait]
impl OrdersApi for TulipClient {
    async fn list_orders(&self, backend: OrdersBackend, limit: usize) -> ApiResult<Vec<OrderRecord>> {
        TulipClient::list_orders(self, backend, limit).await
    }

    async fn create_order(&self, backend: OrdersBackend, order: &OrderRequest) -> ApiResult<OrderAck> {
        TulipClient::create_order(self, backend, order).await
    }
}

#[async_trait]
impl PulseApi for TulipClient {
    async fn fetch_pulse(&self) -> ApiResult<PulseSnapshot> {
        TulipClient::fetch_pulse(self).await
    }
}

#[async_trait]
impl ConfigApi for TulipClient {
    async fn fetch_config(&self) -> ApiResult<ApiConfig> {
        TulipClient::fetch_config(self).await
    }
}
