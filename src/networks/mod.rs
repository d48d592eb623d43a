//! Network registry subsystem.
//!
//! # Data Flow
//! ```text
//! config [[networks]] (optional)
//!     → registry.rs (validated, ordered table)
//!     → Arc<NetworkRegistry> shared by orchestrator and backend clients
//! ```
//!
//! # Design Decisions
//! - Declaration order is significant for progress display only
//! - The table is immutable after startup
//! - Falls back to the reference five-network table when unconfigured

pub mod registry;
pub mod types;

pub use registry::NetworkRegistry;
pub use types::{Network, NetworkId};
