//! Session change notifications.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::orchestrator::FlowEvent;
use crate::session::state::{ConnectionState, SignerState};

/// Broadcast to subscribers whenever session state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ConnectionChanged { state: ConnectionState },
    SignerChanged { state: SignerState },
    VerificationStarted { address: Address },
    VerificationFinished { address: Address, eligible: bool },
    VerificationFailed { address: Address, error: ErrorKind },
    Flow { event: FlowEvent },
    Claimed { address: Address },
    ClaimFailed { address: Address },
}
