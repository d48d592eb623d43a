//! Completion reporting to the backend.
//!
//! # Responsibilities
//! - Per-network confirmation notify (decides confirmed/failed for that network)
//! - Overall completion audit write, best-effort
//! - Claim notification
//!
//! # Design Decisions
//! - Independent of whether eligibility or preparation ever succeeded
//! - Per-network notify retries follow the configured `RetryPolicy`

use alloy::primitives::Address;
use std::sync::Arc;

use crate::backend::client::PresaleBackend;
use crate::backend::types::{BackendResult, ExecuteFlowRequest, MULTICHAIN_CHAIN_NAME};
use crate::networks::Network;
use crate::resilience::RetryPolicy;

/// Pushes confirmation and claim facts to the backend.
#[derive(Clone)]
pub struct CompletionReporter {
    backend: Arc<dyn PresaleBackend>,
    retry: RetryPolicy,
}

impl CompletionReporter {
    pub fn new(backend: Arc<dyn PresaleBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Report that `network` is confirmed for this attempt.
    pub async fn notify_network_confirmed(
        &self,
        address: &Address,
        network: &Network,
        flow_id: &str,
        signature: &str,
    ) -> BackendResult<()> {
        let request = ExecuteFlowRequest::new(address, &network.name, flow_id, signature);
        let backend = self.backend.as_ref();
        let request = &request;
        self.retry
            .run("notify_network_confirmed", move || backend.execute_flow(request))
            .await?;
        tracing::debug!(
            address = %address,
            network = %network.name,
            flow_id = flow_id,
            "Network confirmation reported"
        );
        Ok(())
    }

    /// Report overall completion of an attempt.
    pub async fn notify_flow_completed(
        &self,
        address: &Address,
        flow_id: &str,
        signature: &str,
    ) -> BackendResult<()> {
        let request = ExecuteFlowRequest::new(address, MULTICHAIN_CHAIN_NAME, flow_id, signature);
        self.backend.execute_flow(&request).await?;
        tracing::info!(address = %address, flow_id = flow_id, "Flow completion reported");
        Ok(())
    }

    /// Record a claim for `address`.
    pub async fn notify_claim(&self, address: &Address) -> BackendResult<()> {
        self.backend.claim(address).await?;
        tracing::info!(address = %address, "Claim reported");
        Ok(())
    }
}
