//! Wallet verification and multi-network signature orchestration.

pub mod backend;
pub mod config;
pub mod error;
pub mod networks;
pub mod observability;
pub mod orchestrator;
pub mod resilience;
pub mod session;
pub mod signer;

pub use config::schema::FlowConfig;
pub use error::ErrorKind;
pub use networks::{Network, NetworkId, NetworkRegistry};
pub use orchestrator::{FlowPhase, SignatureFlow, SignatureOrchestrator};
pub use session::{Session, SessionError, SessionEvent, SessionSnapshot};
pub use signer::{ConnectionHandle, SignerBinder, SigningHandle};
