//! Signature orchestration: one signature, then sequential per-network confirmation.
//!
//! # Responsibilities
//! - Generate nonce, timestamp and the canonical message for an attempt
//! - Collect exactly one signature through the bound `SigningHandle`
//! - Confirm every registry network in declaration order, isolating failures
//! - Settle the terminal phase and report overall completion
//!
//! # Design Decisions
//! - Networks are confirmed strictly in sequence so progress is monotonic
//! - A failed network never aborts the networks after it
//! - Progress is pushed to a `FlowObserver` after every transition

use alloy::primitives::Address;
use jiff::Timestamp;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::CompletionReporter;
use crate::config::schema::{FlowConfig, ProgramConfig};
use crate::networks::NetworkRegistry;
use crate::observability::logging::redact_signature;
use crate::observability::metrics;
use crate::orchestrator::flow::{FlowEvent, FlowPhase, SignatureFlow};
use crate::orchestrator::message::{build_message, flow_id, MessageParams};
use crate::resilience::timeouts::{optional_secs, with_optional_timeout};
use crate::signer::{SignerError, SigningHandle};

/// Receives a snapshot of the flow after each transition.
pub trait FlowObserver: Send + Sync {
    fn on_event(&self, flow: &SignatureFlow, event: &FlowEvent);
}

/// Observer that discards everything.
pub struct NoopObserver;

impl FlowObserver for NoopObserver {
    fn on_event(&self, _flow: &SignatureFlow, _event: &FlowEvent) {}
}

/// Drives signature attempts.
#[derive(Clone)]
pub struct SignatureOrchestrator {
    registry: Arc<NetworkRegistry>,
    reporter: CompletionReporter,
    program: ProgramConfig,
    signer_timeout: Option<Duration>,
    progress_delay: Duration,
}

impl SignatureOrchestrator {
    pub fn new(
        registry: Arc<NetworkRegistry>,
        reporter: CompletionReporter,
        config: &FlowConfig,
    ) -> Self {
        Self {
            registry,
            reporter,
            program: config.program.clone(),
            signer_timeout: optional_secs(config.signer.timeout_secs),
            progress_delay: Duration::from_millis(config.confirmation.progress_delay_ms),
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn program(&self) -> &ProgramConfig {
        &self.program
    }

    /// Render the message for `address` without starting an attempt.
    pub fn preview_message(&self, address: &Address, timestamp: Timestamp, nonce: u64) -> String {
        let names = self.registry.names();
        build_message(&MessageParams {
            program: &self.program,
            address,
            networks: &names,
            timestamp,
            nonce,
        })
    }

    /// Start a fresh attempt: `Idle → AwaitingSignature` with a new nonce and message.
    ///
    /// Synchronous so callers can start it inside their own critical section.
    pub fn prepare(&self, address: Address) -> SignatureFlow {
        let nonce: u64 = rand::thread_rng().gen();
        let timestamp = Timestamp::now();
        let mut flow = SignatureFlow::new(address, flow_id(timestamp, nonce), nonce, timestamp);
        flow.await_signature(self.preview_message(&address, timestamp, nonce));

        tracing::info!(
            address = %address,
            flow_id = flow.flow_id(),
            "Signature attempt started"
        );
        flow
    }

    /// Run a whole attempt from `Idle`.
    pub async fn run(
        &self,
        address: Address,
        signer: &dyn SigningHandle,
        observer: &dyn FlowObserver,
    ) -> SignatureFlow {
        let flow = self.prepare(address);
        observer.on_event(&flow, &FlowEvent::AwaitingSignature);
        self.drive(flow, signer, observer).await
    }

    /// Drive a prepared attempt to a terminal phase.
    pub async fn drive(
        &self,
        mut flow: SignatureFlow,
        signer: &dyn SigningHandle,
        observer: &dyn FlowObserver,
    ) -> SignatureFlow {
        let message = match flow.message() {
            Some(message) if flow.phase() == FlowPhase::AwaitingSignature => message.to_string(),
            _ => {
                tracing::error!(flow_id = flow.flow_id(), phase = flow.phase().as_str(), "Flow not awaiting signature");
                return flow;
            }
        };

        let signed = with_optional_timeout(self.signer_timeout, signer.sign(&message))
            .await
            .unwrap_or_else(|elapsed| Err(SignerError::Timeout(elapsed.0.as_secs())));

        let signature = match signed {
            Ok(signature) => signature,
            Err(e) => {
                tracing::warn!(
                    address = %flow.address(),
                    flow_id = flow.flow_id(),
                    error = %e,
                    "Signature not obtained"
                );
                flow.fail(e.kind());
                return self.settle(flow, observer);
            }
        };

        flow.record_signature(signature.clone());
        tracing::info!(
            address = %flow.address(),
            flow_id = flow.flow_id(),
            signature = %redact_signature(&signature),
            "Message signed"
        );
        observer.on_event(&flow, &FlowEvent::Signed);

        flow.start_confirming();
        let address = *flow.address();
        let flow_id = flow.flow_id().to_string();
        let total = self.registry.len();

        for (index, network) in self.registry.iter().enumerate() {
            if !self.progress_delay.is_zero() {
                tokio::time::sleep(self.progress_delay).await;
            }
            observer.on_event(
                &flow,
                &FlowEvent::NetworkStarted {
                    network: network.id,
                    name: network.name.clone(),
                    index,
                    total,
                },
            );

            match self
                .reporter
                .notify_network_confirmed(&address, network, &flow_id, &signature)
                .await
            {
                Ok(()) => {
                    flow.confirm_network(network.id);
                    metrics::record_network_confirmation(&network.name, true);
                    observer.on_event(
                        &flow,
                        &FlowEvent::NetworkConfirmed {
                            network: network.id,
                            name: network.name.clone(),
                            confirmed: flow.confirmed_networks().len(),
                            total,
                        },
                    );
                }
                Err(e) => {
                    flow.fail_network(network.id);
                    metrics::record_network_confirmation(&network.name, false);
                    tracing::warn!(
                        network = %network.name,
                        flow_id = %flow_id,
                        error = %e,
                        "Network confirmation failed, continuing"
                    );
                    observer.on_event(
                        &flow,
                        &FlowEvent::NetworkFailed {
                            network: network.id,
                            name: network.name.clone(),
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        flow.finish(total);
        if !flow.confirmed_networks().is_empty() {
            if let Err(e) = self
                .reporter
                .notify_flow_completed(&address, &flow_id, &signature)
                .await
            {
                tracing::warn!(flow_id = %flow_id, error = %e, "Completion report failed");
            }
        }

        self.settle(flow, observer)
    }

    fn settle(&self, flow: SignatureFlow, observer: &dyn FlowObserver) -> SignatureFlow {
        let phase = flow.phase();
        metrics::record_signature_attempt(phase.as_str());
        tracing::info!(
            address = %flow.address(),
            flow_id = flow.flow_id(),
            phase = phase.as_str(),
            confirmed = flow.confirmed_networks().len(),
            failed = flow.failed_networks().len(),
            "Signature attempt finished"
        );
        observer.on_event(&flow, &FlowEvent::Finished { phase });
        flow
    }
}
