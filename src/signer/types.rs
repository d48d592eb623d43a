//! Signer capability types and errors.

use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::error::ErrorKind;

/// EIP-1193 "user rejected request" provider error code.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors from binding or using a signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The user declined in the wallet UI.
    #[error("User rejected the request (code {code})")]
    Rejected { code: i64 },

    /// Any other signing failure reported by the wallet.
    #[error("Signing failed: {0}")]
    Failed(String),

    /// A signing handle could not be produced for the connection.
    #[error("Signer binding failed: {0}")]
    Binding(String),

    /// The wallet did not answer within the configured limit.
    #[error("Signer timed out after {0} seconds")]
    Timeout(u64),
}

impl SignerError {
    /// Classify a provider error by its RPC code.
    pub fn from_provider(code: i64, message: &str) -> Self {
        if code == USER_REJECTED_CODE {
            Self::Rejected { code }
        } else {
            Self::Failed(format!("{} (code {})", message, code))
        }
    }

    /// User-facing classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { .. } => ErrorKind::UserRejected,
            Self::Binding(_) => ErrorKind::SignerUnavailable,
            Self::Failed(_) | Self::Timeout(_) => ErrorKind::SigningError,
        }
    }
}

/// A signing capability bound to one connected wallet account.
#[async_trait]
pub trait SigningHandle: Send + Sync {
    /// The account this handle signs for.
    fn address(&self) -> Address;

    /// Sign a plaintext message, returning the hex-encoded signature.
    async fn sign(&self, message: &str) -> Result<String, SignerError>;
}

/// A wallet connection as reported by the provider plumbing.
///
/// `id` changes whenever the underlying connection changes identity
/// (reconnect, account switch), which forces a re-bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub id: u64,
    pub address: Address,
}

impl ConnectionHandle {
    pub fn new(id: u64, address: Address) -> Self {
        Self { id, address }
    }
}
