//! User-facing error classification.
//!
//! Subsystems keep their own error enums (`BackendError`, `SignerError`,
//! `SessionError`); this is the coarse kind stored in session state and
//! shown to the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failure surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Eligibility or preparation backend call failed.
    #[error("Unable to verify wallet")]
    VerificationUnavailable,

    /// Signer binding failed or no signer is bound.
    #[error("Signer not initialized")]
    SignerUnavailable,

    /// The user declined the signature request in the wallet.
    #[error("Signature cancelled")]
    UserRejected,

    /// Any other signer failure.
    #[error("Signature failed")]
    SigningError,

    /// A per-network confirmation call failed.
    #[error("Network confirmation failed")]
    NetworkConfirmationFailed,

    /// Claim notification failed.
    #[error("Claim failed")]
    ClaimFailed,
}

impl ErrorKind {
    /// Whether the error halts the flow until the user reconnects or retries.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::VerificationUnavailable | Self::SignerUnavailable)
    }
}
