//! Per-attempt signature flow state machine.
//!
//! # States
//! ```text
//! Idle → AwaitingSignature → Signed → ConfirmingNetworks → Completed
//!                │                                      → PartiallyCompleted
//!                └──────────────→ Failed ←──────────────┘
//! ```
//!
//! # Invariants
//! - `message` is fixed once the attempt leaves `Idle`
//! - `signature` is set at most once
//! - `confirmed_networks` is append-only and duplicate-free

use alloy::primitives::Address;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ErrorKind;
use crate::networks::NetworkId;

/// Phase of one signature attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    Idle,
    AwaitingSignature,
    Signed,
    ConfirmingNetworks,
    Completed,
    PartiallyCompleted,
    Failed,
}

impl FlowPhase {
    /// An attempt in this phase blocks a new one.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::AwaitingSignature | Self::Signed | Self::ConfirmingNetworks
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyCompleted | Self::Failed)
    }

    /// Phases in which a claim may be made.
    pub fn allows_claim(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyCompleted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingSignature => "awaiting_signature",
            Self::Signed => "signed",
            Self::ConfirmingNetworks => "confirming_networks",
            Self::Completed => "completed",
            Self::PartiallyCompleted => "partially_completed",
            Self::Failed => "failed",
        }
    }
}

/// Progress notifications emitted while an attempt runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    AwaitingSignature,
    Signed,
    NetworkStarted {
        network: NetworkId,
        name: String,
        index: usize,
        total: usize,
    },
    NetworkConfirmed {
        network: NetworkId,
        name: String,
        confirmed: usize,
        total: usize,
    },
    NetworkFailed {
        network: NetworkId,
        name: String,
        error: String,
    },
    Finished {
        phase: FlowPhase,
    },
}

/// State of a single signature attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureFlow {
    address: Address,
    flow_id: String,
    nonce: u64,
    timestamp: Timestamp,
    phase: FlowPhase,
    message: Option<String>,
    signature: Option<String>,
    confirmed_networks: Vec<NetworkId>,
    failed_networks: BTreeSet<NetworkId>,
    error: Option<ErrorKind>,
}

impl SignatureFlow {
    pub fn new(address: Address, flow_id: String, nonce: u64, timestamp: Timestamp) -> Self {
        Self {
            address,
            flow_id,
            nonce,
            timestamp,
            phase: FlowPhase::Idle,
            message: None,
            signature: None,
            confirmed_networks: Vec::new(),
            failed_networks: BTreeSet::new(),
            error: None,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn confirmed_networks(&self) -> &[NetworkId] {
        &self.confirmed_networks
    }

    pub fn failed_networks(&self) -> &BTreeSet<NetworkId> {
        &self.failed_networks
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.error
    }

    /// "k/N networks verified".
    pub fn progress_label(&self, total: usize) -> String {
        format!("{}/{} networks verified", self.confirmed_networks.len(), total)
    }

    /// `Idle → AwaitingSignature`, fixing the message for this attempt.
    pub(crate) fn await_signature(&mut self, message: String) {
        debug_assert_eq!(self.phase, FlowPhase::Idle);
        self.message = Some(message);
        self.phase = FlowPhase::AwaitingSignature;
    }

    /// `AwaitingSignature → Signed`. Returns false if a signature was already recorded.
    pub(crate) fn record_signature(&mut self, signature: String) -> bool {
        if self.signature.is_some() || self.phase != FlowPhase::AwaitingSignature {
            return false;
        }
        self.signature = Some(signature);
        self.phase = FlowPhase::Signed;
        true
    }

    /// `Signed → ConfirmingNetworks`.
    pub(crate) fn start_confirming(&mut self) {
        debug_assert_eq!(self.phase, FlowPhase::Signed);
        self.phase = FlowPhase::ConfirmingNetworks;
    }

    pub(crate) fn confirm_network(&mut self, network: NetworkId) {
        if !self.confirmed_networks.contains(&network) {
            self.confirmed_networks.push(network);
        }
    }

    pub(crate) fn fail_network(&mut self, network: NetworkId) {
        self.failed_networks.insert(network);
    }

    /// Settle the terminal phase from the confirmation counts.
    pub(crate) fn finish(&mut self, total: usize) -> FlowPhase {
        let confirmed = self.confirmed_networks.len();
        self.phase = if confirmed == total && total > 0 {
            FlowPhase::Completed
        } else if confirmed > 0 {
            FlowPhase::PartiallyCompleted
        } else {
            self.error = Some(ErrorKind::NetworkConfirmationFailed);
            FlowPhase::Failed
        };
        self.phase
    }

    /// Abort the attempt.
    pub(crate) fn fail(&mut self, kind: ErrorKind) {
        self.error = Some(kind);
        self.phase = FlowPhase::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> SignatureFlow {
        let mut flow = SignatureFlow::new(Address::ZERO, "SIG-1".into(), 1, Timestamp::UNIX_EPOCH);
        flow.await_signature("hello".into());
        flow
    }

    #[test]
    fn test_phase_predicates() {
        assert!(!FlowPhase::Idle.is_active());
        assert!(FlowPhase::AwaitingSignature.is_active());
        assert!(FlowPhase::ConfirmingNetworks.is_active());
        assert!(FlowPhase::PartiallyCompleted.is_terminal());
        assert!(FlowPhase::PartiallyCompleted.allows_claim());
        assert!(!FlowPhase::Failed.allows_claim());
    }

    #[test]
    fn test_signature_set_once() {
        let mut flow = flow();
        assert!(flow.record_signature("0xSIG".into()));
        assert!(!flow.record_signature("0xOTHER".into()));
        assert_eq!(flow.signature(), Some("0xSIG"));
        assert_eq!(flow.phase(), FlowPhase::Signed);
    }

    #[test]
    fn test_confirmed_networks_no_duplicates() {
        let mut flow = flow();
        flow.record_signature("0xSIG".into());
        flow.start_confirming();
        flow.confirm_network(NetworkId(1));
        flow.confirm_network(NetworkId(1));
        flow.confirm_network(NetworkId(56));
        assert_eq!(flow.confirmed_networks(), &[NetworkId(1), NetworkId(56)]);
    }

    #[test]
    fn test_terminal_phases() {
        let mut all = flow();
        all.confirm_network(NetworkId(1));
        all.confirm_network(NetworkId(2));
        assert_eq!(all.finish(2), FlowPhase::Completed);
        assert_eq!(all.error(), None);

        let mut partial = flow();
        partial.confirm_network(NetworkId(1));
        partial.fail_network(NetworkId(2));
        assert_eq!(partial.finish(2), FlowPhase::PartiallyCompleted);
        assert_eq!(partial.progress_label(2), "1/2 networks verified");

        let mut none = flow();
        none.fail_network(NetworkId(1));
        none.fail_network(NetworkId(2));
        assert_eq!(none.finish(2), FlowPhase::Failed);
        assert_eq!(none.error(), Some(ErrorKind::NetworkConfirmationFailed));
    }

    #[test]
    fn test_fail_sets_error() {
        let mut flow = flow();
        flow.fail(ErrorKind::UserRejected);
        assert_eq!(flow.phase(), FlowPhase::Failed);
        assert_eq!(flow.error(), Some(ErrorKind::UserRejected));
        assert_eq!(flow.message(), Some("hello"));
        assert!(flow.signature().is_none());
    }
}
