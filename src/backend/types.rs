//! Backend wire types, domain results and error definitions.

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::networks::NetworkId;

/// Errors that can occur talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection or request failed before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    /// Backend answered with `success: false`.
    #[error("{endpoint} rejected the request: {reason}")]
    Rejected { endpoint: String, reason: String },

    /// Response body could not be decoded.
    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Base URL could not be used.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Standard response envelope: `{success, data?, error?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating `success: false` or a missing payload as errors.
    pub fn into_data(self, endpoint: &str) -> BackendResult<T> {
        if !self.success {
            return Err(BackendError::Rejected {
                endpoint: endpoint.to_string(),
                reason: self
                    .error
                    .or(self.message)
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }
        self.data.ok_or_else(|| BackendError::Decode {
            endpoint: endpoint.to_string(),
            reason: "missing data".to_string(),
        })
    }
}

/// Body for endpoints keyed only by wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    pub wallet_address: String,
}

impl WalletRequest {
    pub fn new(address: &Address) -> Self {
        Self {
            wallet_address: address.to_string(),
        }
    }
}

/// Body for `/presale/execute-flow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteFlowRequest {
    pub wallet_address: String,
    pub chain_name: String,
    pub flow_id: String,
    pub tx_hash: String,
}

/// `chainName` used for the overall-completion report.
pub const MULTICHAIN_CHAIN_NAME: &str = "MULTICHAIN";

/// Length of the `txHash` field: `0x` plus 32 bytes of hex.
pub const TX_HASH_FIELD_LEN: usize = 66;

impl ExecuteFlowRequest {
    pub fn new(address: &Address, chain_name: &str, flow_id: &str, signature: &str) -> Self {
        Self {
            wallet_address: address.to_string(),
            chain_name: chain_name.to_string(),
            flow_id: flow_id.to_string(),
            tx_hash: signature.chars().take(TX_HASH_FIELD_LEN).collect(),
        }
    }
}

/// `data` of `/presale/connect`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub is_eligible: bool,
    #[serde(default)]
    pub token_allocation: Option<WireAllocation>,
    #[serde(default)]
    pub raw_data: Vec<WireBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAllocation {
    #[serde(deserialize_with = "decimal_string")]
    pub amount: String,
    #[serde(rename = "valueUSD", deserialize_with = "decimal_string")]
    pub value_usd: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBalance {
    pub chain: String,
    #[serde(deserialize_with = "decimal_string")]
    pub amount: String,
    #[serde(rename = "valueUSD", default, deserialize_with = "decimal_f64")]
    pub value_usd: f64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

/// `data` of `/presale/prepare-flow`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrepareResponse {
    #[serde(default)]
    pub transactions: Vec<PreparedTransaction>,
}

/// One prepared per-network operation, kept for progress display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedTransaction {
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Token allocation offered to a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub amount: String,
    pub value_usd: String,
}

/// Balance held on one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBalance {
    pub amount: String,
    pub value_usd: f64,
    pub symbol: String,
}

/// Outcome of an eligibility check for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub address: Address,
    pub is_eligible: bool,
    pub allocation: Allocation,
    pub per_network_balances: BTreeMap<NetworkId, NetworkBalance>,
}

impl EligibilityResult {
    /// Sum of USD value across networks.
    pub fn total_value_usd(&self) -> f64 {
        self.per_network_balances.values().map(|b| b.value_usd).sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

fn decimal_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}

fn decimal_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
