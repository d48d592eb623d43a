//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to backend or signer:
//!     → timeouts.rs (optional deadline around the future)
//!     → On failure: retries.rs (exponential delay with jitter while attempts remain)
//! ```
//!
//! # Design Decisions
//! - Retry is opt-in; the default policy makes exactly one attempt
//! - Timeout errors are distinct from other errors

pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{with_optional_timeout, TimedOut};
