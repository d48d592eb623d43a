//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FlowConfig (validated, immutable)
//!     → handed to Session::from_config / flow-cli
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; sessions are rebuilt to pick up changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::FlowConfig;
pub use schema::BackendConfig;
pub use schema::ConfirmationConfig;
pub use schema::NetworkConfig;
pub use schema::ProgramConfig;
