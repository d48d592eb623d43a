//! Eligibility checks with per-address in-flight suppression.

use alloy::primitives::Address;
use dashmap::DashSet;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::client::PresaleBackend;
use crate::backend::types::{
    Allocation, BackendResult, ConnectResponse, EligibilityResult, NetworkBalance,
};
use crate::config::schema::ProgramConfig;
use crate::networks::NetworkRegistry;

/// Result of asking for an eligibility check.
#[derive(Debug, Clone, PartialEq)]
pub enum EligibilityCheck {
    /// The backend answered.
    Completed(EligibilityResult),
    /// A check for this address is already running; nothing was sent.
    AlreadyInFlight,
}

/// Client that classifies wallets via `/presale/connect`.
#[derive(Clone)]
pub struct EligibilityClient {
    backend: Arc<dyn PresaleBackend>,
    registry: Arc<NetworkRegistry>,
    default_allocation: Allocation,
    in_flight: Arc<DashSet<Address>>,
}

/// Marks an address as being checked; released on drop.
pub struct InFlight<'a> {
    client: &'a EligibilityClient,
    address: Address,
}

impl EligibilityClient {
    pub fn new(
        backend: Arc<dyn PresaleBackend>,
        registry: Arc<NetworkRegistry>,
        program: &ProgramConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            default_allocation: Allocation {
                amount: program.allocation_amount.clone(),
                value_usd: program.allocation_value_usd.clone(),
            },
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Claim the in-flight slot for `address`, or `None` if a check is already running.
    pub fn begin(&self, address: Address) -> Option<InFlight<'_>> {
        if self.in_flight.insert(address) {
            Some(InFlight { client: self, address })
        } else {
            tracing::debug!(address = %address, "Eligibility check already in flight");
            None
        }
    }

    pub fn is_in_flight(&self, address: &Address) -> bool {
        self.in_flight.contains(address)
    }

    /// Check eligibility unless a check for the same address is already running.
    pub async fn check_eligibility(&self, address: Address) -> BackendResult<EligibilityCheck> {
        match self.begin(address) {
            Some(slot) => slot.check().await.map(EligibilityCheck::Completed),
            None => Ok(EligibilityCheck::AlreadyInFlight),
        }
    }

    fn to_result(&self, address: Address, response: ConnectResponse) -> EligibilityResult {
        let allocation = response
            .token_allocation
            .map(|a| Allocation {
                amount: a.amount,
                value_usd: a.value_usd,
            })
            .unwrap_or_else(|| self.default_allocation.clone());

        let mut per_network_balances = BTreeMap::new();
        for item in response.raw_data {
            match self.registry.find_by_name(&item.chain) {
                Some(network) => {
                    per_network_balances.insert(
                        network.id,
                        NetworkBalance {
                            amount: item.amount,
                            value_usd: item.value_usd,
                            symbol: item.symbol.unwrap_or_else(|| network.symbol.clone()),
                        },
                    );
                }
                None => {
                    tracing::debug!(chain = %item.chain, "Ignoring balance for unknown network");
                }
            }
        }

        EligibilityResult {
            address,
            is_eligible: response.is_eligible,
            allocation,
            per_network_balances,
        }
    }
}

impl InFlight<'_> {
    pub fn address(&self) -> Address {
        self.address
    }

    /// Perform the backend call, releasing the slot when done.
    pub async fn check(self) -> BackendResult<EligibilityResult> {
        tracing::info!(address = %self.address, "Checking wallet eligibility");
        let response = self.client.backend.connect(&self.address).await?;
        let result = self.client.to_result(self.address, response);
        tracing::info!(
            address = %self.address,
            eligible = result.is_eligible,
            networks = result.per_network_balances.len(),
            "Eligibility check complete"
        );
        Ok(result)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.client.in_flight.remove(&self.address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{
        BackendError, ExecuteFlowRequest, PreparedTransaction, WireAllocation, WireBalance,
    };
    use crate::networks::NetworkId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Notify;

    struct StubBackend {
        response: Option<ConnectResponse>,
        calls: AtomicU32,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl PresaleBackend for StubBackend {
        async fn connect(&self, _address: &Address) -> BackendResult<ConnectResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone().ok_or(BackendError::Transport("offline".into()))
        }

        async fn prepare_flow(&self, _address: &Address) -> BackendResult<Vec<PreparedTransaction>> {
            Ok(Vec::new())
        }

        async fn execute_flow(&self, _request: &ExecuteFlowRequest) -> BackendResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        async fn claim(&self, _address: &Address) -> BackendResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    fn client(backend: Arc<StubBackend>) -> EligibilityClient {
        EligibilityClient::new(
            backend,
            Arc::new(NetworkRegistry::reference()),
            &ProgramConfig::default(),
        )
    }

    fn response(allocation: Option<WireAllocation>) -> ConnectResponse {
        ConnectResponse {
            is_eligible: true,
            token_allocation: allocation,
            raw_data: vec![
                WireBalance {
                    chain: "polygon".into(),
                    amount: "12".into(),
                    value_usd: 9.0,
                    symbol: None,
                    contract_address: None,
                },
                WireBalance {
                    chain: "Dogechain".into(),
                    amount: "1".into(),
                    value_usd: 1.0,
                    symbol: Some("DOGE".into()),
                    contract_address: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_maps_balances_and_default_allocation() {
        let backend = Arc::new(StubBackend {
            response: Some(response(None)),
            calls: AtomicU32::new(0),
            gate: None,
        });
        let client = client(backend);
        let result = match client.check_eligibility(Address::ZERO).await.unwrap() {
            EligibilityCheck::Completed(result) => result,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(result.allocation.amount, "5000");
        assert_eq!(result.per_network_balances.len(), 1);
        assert_eq!(result.per_network_balances[&NetworkId(137)].symbol, "MATIC");
        assert!(!client.is_in_flight(&Address::ZERO));
    }

    #[tokio::test]
    async fn test_backend_allocation_wins() {
        let backend = Arc::new(StubBackend {
            response: Some(response(Some(WireAllocation {
                amount: "7500".into(),
                value_usd: "1275".into(),
            }))),
            calls: AtomicU32::new(0),
            gate: None,
        });
        let result = client(backend).begin(Address::ZERO).unwrap().check().await.unwrap();
        assert_eq!(result.allocation.amount, "7500");
    }

    #[tokio::test]
    async fn test_failure_releases_slot() {
        let backend = Arc::new(StubBackend {
            response: None,
            calls: AtomicU32::new(0),
            gate: None,
        });
        let client = client(backend);
        assert!(client.check_eligibility(Address::ZERO).await.is_err());
        assert!(!client.is_in_flight(&Address::ZERO));
    }

    #[tokio::test]
    async fn test_concurrent_check_suppressed() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(StubBackend {
            response: Some(response(None)),
            calls: AtomicU32::new(0),
            gate: Some(gate.clone()),
        });
        let client = client(backend.clone());

        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.check_eligibility(Address::ZERO).await })
        };
        while !client.is_in_flight(&Address::ZERO) {
            tokio::task::yield_now().await;
        }

        let second = client.check_eligibility(Address::ZERO).await.unwrap();
        assert_eq!(second, EligibilityCheck::AlreadyInFlight);

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, EligibilityCheck::Completed(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
