//! Backend HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - POST JSON bodies to the four backend endpoints
//! - Map transport, status and envelope failures to `BackendError`
//! - Tag every request with a request id for server-side correlation

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::types::{
    BackendError, BackendResult, ConnectResponse, Envelope, ExecuteFlowRequest, PrepareResponse,
    PreparedTransaction, WalletRequest,
};
use crate::config::schema::BackendConfig;
use crate::observability::metrics;

pub const CONNECT_PATH: &str = "/presale/connect";
pub const PREPARE_FLOW_PATH: &str = "/presale/prepare-flow";
pub const EXECUTE_FLOW_PATH: &str = "/presale/execute-flow";
pub const CLAIM_PATH: &str = "/presale/claim";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The backend capability consumed by the eligibility, preparation and
/// completion clients.
#[async_trait]
pub trait PresaleBackend: Send + Sync {
    /// Classify a wallet (`/presale/connect`).
    async fn connect(&self, address: &Address) -> BackendResult<ConnectResponse>;

    /// Materialize prepared operations (`/presale/prepare-flow`).
    async fn prepare_flow(&self, address: &Address) -> BackendResult<Vec<PreparedTransaction>>;

    /// Report a confirmation (`/presale/execute-flow`).
    async fn execute_flow(&self, request: &ExecuteFlowRequest) -> BackendResult<serde_json::Value>;

    /// Record a claim (`/presale/claim`).
    async fn claim(&self, address: &Address) -> BackendResult<serde_json::Value>;
}

/// reqwest-backed implementation of [`PresaleBackend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("'{}': {}", config.base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BackendError::InvalidUrl(format!(
                "'{}': unsupported scheme",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        tracing::info!(
            base_url = %config.base_url,
            request_timeout_secs = config.request_timeout_secs,
            "Backend client initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` and return the raw response text on a 2xx status.
    async fn post_text<B: Serialize + ?Sized>(&self, path: &'static str, body: &B) -> BackendResult<String> {
        let request_id = Uuid::new_v4();
        tracing::debug!(endpoint = path, request_id = %request_id, "Backend request");

        let result: BackendResult<String> = async {
            let response = self
                .client
                .post(self.endpoint_url(path))
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .json(body)
                .send()
                .await
                .map_err(|e| map_reqwest_error(path, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(BackendError::Status {
                    endpoint: path.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().await.map_err(|e| map_reqwest_error(path, e))
        }
        .await;

        metrics::record_backend_call(path, result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(endpoint = path, request_id = %request_id, error = %e, "Backend request failed");
        }
        result
    }

    /// POST and unwrap a `{success, data}` envelope.
    async fn post_envelope<B, T>(&self, path: &'static str, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.post_text(path, body).await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;
        envelope.into_data(path)
    }

    /// POST an acknowledgement-style request; any 2xx body is accepted
    /// unless it is an envelope with `success: false`.
    async fn post_ack<B: Serialize + ?Sized>(&self, path: &'static str, body: &B) -> BackendResult<serde_json::Value> {
        let text = self.post_text(path, body).await?;
        parse_ack(path, &text)
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl PresaleBackend for HttpBackend {
    async fn connect(&self, address: &Address) -> BackendResult<ConnectResponse> {
        self.post_envelope(CONNECT_PATH, &WalletRequest::new(address)).await
    }

    async fn prepare_flow(&self, address: &Address) -> BackendResult<Vec<PreparedTransaction>> {
        let data: PrepareResponse = self
            .post_envelope(PREPARE_FLOW_PATH, &WalletRequest::new(address))
            .await?;
        Ok(data.transactions)
    }

    async fn execute_flow(&self, request: &ExecuteFlowRequest) -> BackendResult<serde_json::Value> {
        self.post_ack(EXECUTE_FLOW_PATH, request).await
    }

    async fn claim(&self, address: &Address) -> BackendResult<serde_json::Value> {
        self.post_ack(CLAIM_PATH, &WalletRequest::new(address)).await
    }
}

fn map_reqwest_error(endpoint: &str, e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(endpoint.to_string())
    } else if e.is_decode() {
        BackendError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    } else {
        BackendError::Transport(e.to_string())
    }
}

fn parse_ack(endpoint: &str, text: &str) -> BackendResult<serde_json::Value> {
    let value = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value,
        Err(_) => return Ok(serde_json::Value::String(text.to_string())),
    };

    if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
        let reason = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|r| r.as_str())
            .unwrap_or("no reason given")
            .to_string();
        return Err(BackendError::Rejected {
            endpoint: endpoint.to_string(),
            reason,
        });
    }
    Ok(value)
}
