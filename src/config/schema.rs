//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the verification orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FlowConfig {
    /// Backend service endpoint and timeouts.
    pub backend: BackendConfig,

    /// Program identity and allocation embedded in the signed message.
    pub program: ProgramConfig,

    /// Signer call settings.
    pub signer: SignerConfig,

    /// Per-network confirmation loop settings.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Network table; empty means the reference deployment.
    pub networks: Vec<NetworkConfig>,
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; endpoint paths such as `/presale/connect` are appended.
    pub base_url: String,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

/// Program identity and fixed allocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Program identifier, first line of the signed message.
    pub identifier: String,

    /// Symbol of the allocated token.
    pub token_symbol: String,

    /// Fixed allocation amount (used when the backend omits one).
    pub allocation_amount: String,

    /// USD value of the fixed allocation.
    pub allocation_value_usd: String,

    /// Current bonus percentage.
    pub current_bonus_pct: u32,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            identifier: "MULTICHAIN VERIFICATION".to_string(),
            token_symbol: "TOKEN".to_string(),
            allocation_amount: "5000".to_string(),
            allocation_value_usd: "850".to_string(),
            current_bonus_pct: 25,
        }
    }
}

/// Signer call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Maximum time to wait for the wallet to return a signature (0 = no limit).
    pub timeout_secs: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

/// Confirmation loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Attempts per network notify call (1 = no retry).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Pause before each network step, for progress display.
    pub progress_delay_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 200,
            max_delay_ms: 2000,
            progress_delay_ms: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// A network entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Chain id.
    pub id: u64,

    /// Display name.
    pub name: String,

    /// Native currency symbol.
    pub symbol: String,

    /// Block explorer base URL.
    pub explorer_url: String,

    /// Optional contract address (hex).
    #[serde(default)]
    pub contract_address: Option<String>,
}
