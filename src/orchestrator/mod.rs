//! Signature orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Session::begin_signature_flow
//!     → engine.rs prepare (nonce, timestamp, message.rs text)
//!     → SigningHandle::sign (single suspension on the user)
//!     → engine.rs drive (registry order, CompletionReporter per network)
//!     → flow.rs terminal phase (Completed / PartiallyCompleted / Failed)
//! ```

pub mod engine;
pub mod flow;
pub mod message;

pub use engine::{FlowObserver, NoopObserver, SignatureOrchestrator};
pub use flow::{FlowEvent, FlowPhase, SignatureFlow};
