//! Metrics collection.
//!
//! # Metrics
//! - `verify_backend_calls_total` (counter): backend calls by endpoint, outcome
//! - `verify_signature_attempts_total` (counter): attempts by terminal phase
//! - `verify_network_confirmations_total` (counter): per network, outcome
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op unless the host installs a recorder

use metrics::counter;

pub fn record_backend_call(endpoint: &'static str, success: bool) {
    counter!(
        "verify_backend_calls_total",
        "endpoint" => endpoint,
        "outcome" => outcome(success)
    )
    .increment(1);
}

pub fn record_signature_attempt(phase: &'static str) {
    counter!("verify_signature_attempts_total", "phase" => phase).increment(1);
}

pub fn record_network_confirmation(network: &str, success: bool) {
    counter!(
        "verify_network_confirmations_total",
        "network" => network.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
