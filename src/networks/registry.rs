//! Ordered table of supported networks.

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::NetworkConfig;
use crate::networks::types::{Network, NetworkId};

/// Errors building a registry from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Network registry is empty")]
    Empty,

    #[error("Duplicate network id {0}")]
    DuplicateId(u64),

    #[error("Invalid contract address for {network}: {reason}")]
    InvalidContractAddress { network: String, reason: String },
}

/// Immutable, ordered set of networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
}

impl NetworkRegistry {
    /// Build a registry from an explicit list, preserving order.
    pub fn new(networks: Vec<Network>) -> Result<Self, RegistryError> {
        if networks.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, network) in networks.iter().enumerate() {
            if networks[..i].iter().any(|n| n.id == network.id) {
                return Err(RegistryError::DuplicateId(network.id.0));
            }
        }
        Ok(Self { networks })
    }

    /// The reference five-network deployment.
    pub fn reference() -> Self {
        Self {
            networks: vec![
                Network::new(1, "Ethereum", "ETH", "https://etherscan.io"),
                Network::new(56, "BSC", "BNB", "https://bscscan.com"),
                Network::new(137, "Polygon", "MATIC", "https://polygonscan.com"),
                Network::new(42161, "Arbitrum", "ETH", "https://arbiscan.io"),
                Network::new(43114, "Avalanche", "AVAX", "https://snowtrace.io"),
            ],
        }
    }

    /// Build from `[[networks]]` config entries; empty config yields the reference table.
    pub fn from_config(configs: &[NetworkConfig]) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Ok(Self::reference());
        }

        let mut networks = Vec::with_capacity(configs.len());
        for cfg in configs {
            let contract_address = match cfg.contract_address.as_deref() {
                Some(raw) if !raw.is_empty() => Some(raw.parse::<Address>().map_err(|e| {
                    RegistryError::InvalidContractAddress {
                        network: cfg.name.clone(),
                        reason: e.to_string(),
                    }
                })?),
                _ => None,
            };
            networks.push(Network {
                id: NetworkId(cfg.id),
                name: cfg.name.clone(),
                symbol: cfg.symbol.clone(),
                contract_address,
                explorer_url: cfg.explorer_url.clone(),
            });
        }

        Self::new(networks)
    }

    /// Networks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn get(&self, id: NetworkId) -> Option<&Network> {
        self.networks.iter().find(|n| n.id == id)
    }

    /// Case-insensitive lookup by display name (the backend's `chain` field).
    pub fn find_by_name(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }

    /// Display names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.name.as_str()).collect()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::reference()
    }
}
