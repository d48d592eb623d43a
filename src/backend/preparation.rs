//! Flow preparation for eligible wallets.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::backend::client::PresaleBackend;
use crate::backend::types::{BackendResult, PreparedTransaction};

/// Client for `/presale/prepare-flow`.
#[derive(Clone)]
pub struct FlowPreparationClient {
    backend: Arc<dyn PresaleBackend>,
}

impl FlowPreparationClient {
    pub fn new(backend: Arc<dyn PresaleBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend for the prepared operation list.
    ///
    /// Callers treat failure as non-fatal; the list is only shown as progress.
    pub async fn prepare_flow(&self, address: Address) -> BackendResult<Vec<PreparedTransaction>> {
        let transactions = self.backend.prepare_flow(&address).await?;
        tracing::info!(
            address = %address,
            prepared = transactions.len(),
            "Flow prepared"
        );
        Ok(transactions)
    }
}
