//! Signer binding subsystem.
//!
//! # Data Flow
//! ```text
//! wallet provider (connection handle)
//!     → binding.rs (SignerBinder::bind, address cross-check)
//!     → types.rs SigningHandle (sign, address)
//!     → orchestrator (single sign call per attempt)
//! ```
//!
//! # Security Constraints
//! - The crate never sees private keys; signing is delegated to the wallet
//! - Signatures are logged only in redacted form

pub mod binding;
pub mod types;

pub use binding::{bind_signer, BoundSigner, SignerBinder};
pub use types::{ConnectionHandle, SignerError, SigningHandle, USER_REJECTED_CODE};
