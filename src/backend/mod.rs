//! Backend integration subsystem.
//!
//! # Data Flow
//! ```text
//! wallet address
//!     → eligibility.rs (/presale/connect, in-flight guard per address)
//!     → preparation.rs (/presale/prepare-flow, eligible wallets only)
//!     → reporter.rs (/presale/execute-flow per network + overall, /presale/claim)
//!
//! All three sit on client.rs (PresaleBackend trait, reqwest implementation).
//! ```
//!
//! # Design Decisions
//! - Every request has a bounded timeout from configuration
//! - Transport, status and envelope failures are distinct error variants
//! - No automatic retry except the opt-in per-network notify policy

pub mod client;
pub mod eligibility;
pub mod preparation;
pub mod reporter;
pub mod types;

pub use client::{HttpBackend, PresaleBackend};
pub use eligibility::{EligibilityCheck, EligibilityClient};
pub use preparation::FlowPreparationClient;
pub use reporter::CompletionReporter;
pub use types::{
    Allocation, BackendError, EligibilityResult, ExecuteFlowRequest, NetworkBalance,
    PreparedTransaction,
};
