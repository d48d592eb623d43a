//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Session, orchestrator and backend clients produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → Whatever subscriber / recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Addresses and flow ids are logged as fields; signatures never in full
//! - The library installs no metrics exporter

pub mod logging;
pub mod metrics;
