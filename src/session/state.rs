//! Observable session state.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::backend::{EligibilityResult, PreparedTransaction};
use crate::error::ErrorKind;
use crate::orchestrator::SignatureFlow;

/// Wallet connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Signer binding status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerState {
    #[default]
    Unavailable,
    Initializing,
    Ready,
    Failed,
}

/// The connected wallet, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub connection_state: ConnectionState,
    pub signer_state: SignerState,
}

impl WalletSession {
    /// `Ready` signer implies a connected wallet with an address.
    pub fn is_consistent(&self) -> bool {
        self.signer_state != SignerState::Ready
            || (self.connection_state == ConnectionState::Connected && self.address.is_some())
    }

    pub fn can_sign(&self) -> bool {
        self.connection_state == ConnectionState::Connected
            && self.signer_state == SignerState::Ready
            && self.address.is_some()
    }
}

/// Point-in-time copy of everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub wallet: WalletSession,
    pub eligibility: Option<EligibilityResult>,
    pub prepared: Vec<PreparedTransaction>,
    pub flow: Option<SignatureFlow>,
    /// Human-readable progress line.
    pub status: String,
    pub error: Option<ErrorKind>,
    /// Set on a completed flow or a successful claim.
    pub celebrate: bool,
}

impl SessionSnapshot {
    pub fn is_eligible(&self) -> bool {
        self.eligibility.as_ref().map(|e| e.is_eligible).unwrap_or(false)
    }
}

/// Short display form of an address, `0x1234...abcd`.
pub fn format_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_wallet_invariant() {
        let mut wallet = WalletSession::default();
        assert!(wallet.is_consistent());

        wallet.signer_state = SignerState::Ready;
        assert!(!wallet.is_consistent());

        wallet.connection_state = ConnectionState::Connected;
        wallet.address = Some(Address::ZERO);
        assert!(wallet.is_consistent());
        assert!(wallet.can_sign());
    }

    #[test]
    fn test_format_address() {
        let addr = address!("1234000000000000000000000000000000abcdef");
        let short = format_address(&addr);
        assert!(short.starts_with("0x1234..."));
        assert!(short.to_lowercase().ends_with("cdef"));
    }
}
