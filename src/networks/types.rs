//! Network identity types.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain identifier for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<NetworkId> for u64 {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A supported network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Chain id (e.g., 1 for Ethereum mainnet).
    pub id: NetworkId,
    /// Display name, also the `chainName` sent to the backend.
    pub name: String,
    /// Native currency symbol.
    pub symbol: String,
    /// Operator-supplied contract address, if any.
    pub contract_address: Option<Address>,
    /// Block explorer base URL.
    pub explorer_url: String,
}

impl Network {
    pub fn new(id: u64, name: &str, symbol: &str, explorer_url: &str) -> Self {
        Self {
            id: NetworkId(id),
            name: name.to_string(),
            symbol: symbol.to_string(),
            contract_address: None,
            explorer_url: explorer_url.to_string(),
        }
    }

    /// Explorer page for an address on this network.
    pub fn explorer_address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_conversion() {
        let id = NetworkId::from(137u64);
        assert_eq!(id.0, 137);
        assert_eq!(u64::from(id), 137);
        assert_eq!(id.to_string(), "137");
    }

    #[test]
    fn test_explorer_address_url() {
        let network = Network::new(1, "Ethereum", "ETH", "https://etherscan.io/");
        let url = network.explorer_address_url(&Address::ZERO);
        assert_eq!(
            url,
            "https://etherscan.io/address/0x0000000000000000000000000000000000000000"
        );
    }
}
