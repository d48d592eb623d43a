//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! wallet connection (ConnectionHandle)
//!     → manager.rs connect_wallet (signer binding, automatic verification)
//!     → manager.rs begin_verification (EligibilityClient, FlowPreparationClient)
//!     → manager.rs begin_signature_flow (SignatureOrchestrator)
//!     → manager.rs claim (CompletionReporter)
//!
//! Every change lands in state.rs (SessionSnapshot) and is broadcast as an
//! events.rs SessionEvent.
//! ```
//!
//! # Design Decisions
//! - One session per connected wallet; state is owned, not global
//! - Snapshots are cloned out so readers never hold the state lock

pub mod events;
pub mod manager;
pub mod state;

pub use events::SessionEvent;
pub use manager::{Session, SessionError, Verification};
pub use state::{format_address, ConnectionState, SessionSnapshot, SignerState, WalletSession};
