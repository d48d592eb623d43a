//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Check the network table for duplicates and malformed entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FlowConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;
use std::collections::HashSet;
use std::fmt;

use crate::config::schema::FlowConfig;

/// Upper bound on the bonus percentage.
pub const MAX_BONUS_PCT: u32 = 1000;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FlowConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "backend.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }
    if config.backend.request_timeout_secs == 0 {
        errors.push(ValidationError::new("backend.request_timeout_secs", "must be > 0"));
    }
    if config.backend.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("backend.connect_timeout_secs", "must be > 0"));
    }

    let program = &config.program;
    if program.identifier.trim().is_empty() {
        errors.push(ValidationError::new("program.identifier", "must not be empty"));
    }
    if program.token_symbol.trim().is_empty() {
        errors.push(ValidationError::new("program.token_symbol", "must not be empty"));
    }
    if program.allocation_amount.parse::<f64>().is_err() {
        errors.push(ValidationError::new("program.allocation_amount", "must be numeric"));
    }
    if program.allocation_value_usd.parse::<f64>().is_err() {
        errors.push(ValidationError::new("program.allocation_value_usd", "must be numeric"));
    }
    if program.current_bonus_pct > MAX_BONUS_PCT {
        errors.push(ValidationError::new(
            "program.current_bonus_pct",
            format!("must be <= {}", MAX_BONUS_PCT),
        ));
    }

    let confirmation = &config.confirmation;
    if confirmation.max_attempts == 0 {
        errors.push(ValidationError::new("confirmation.max_attempts", "must be >= 1"));
    }
    if confirmation.base_delay_ms > confirmation.max_delay_ms {
        errors.push(ValidationError::new(
            "confirmation.base_delay_ms",
            "must not exceed confirmation.max_delay_ms",
        ));
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for (i, network) in config.networks.iter().enumerate() {
        let field = format!("networks[{}]", i);
        if !ids.insert(network.id) {
            errors.push(ValidationError::new(
                format!("{}.id", field),
                format!("duplicate network id {}", network.id),
            ));
        }
        if network.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !names.insert(network.name.to_ascii_lowercase()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate network name '{}'", network.name),
            ));
        }
        if url::Url::parse(&network.explorer_url).is_err() {
            errors.push(ValidationError::new(
                format!("{}.explorer_url", field),
                "must be a valid URL",
            ));
        }
        if let Some(addr) = network.contract_address.as_deref() {
            if !addr.is_empty() && addr.parse::<Address>().is_err() {
                errors.push(ValidationError::new(
                    format!("{}.contract_address", field),
                    "must be a 20-byte hex address",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
