//! Flow network descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

/// Endpoints for one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub access_node: &'static str,
    pub discovery_wallet: &'static str,
    pub explorer_url: &'static str,
    pub fungible_token: &'static str,
    pub flow_token: &'static str,
}

const TESTNET: NetworkConfig = NetworkConfig {
    access_node: "https://rest-testnet.onflow.org",
    discovery_wallet: "https://fcl-discovery.onflow.org/testnet/authn",
    explorer_url: "https://testnet.flowscan.io",
    fungible_token: "0x9a0766d93b6608b7",
    flow_token: "0x7e60df042a9c0868",
};

const MAINNET: NetworkConfig = NetworkConfig {
    access_node: "https://rest-mainnet.onflow.org",
    discovery_wallet: "https://fcl-discovery.onflow.org/authn",
    explorer_url: "https://flowscan.io",
    fungible_token: "0xf233dcee88fe0abe",
    flow_token: "0x1654653399040a61",
};

impl Network {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            _ => Err(format!("Invalid network: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn config(&self) -> &'static NetworkConfig {
        match self {
            Network::Testnet => &TESTNET,
            Network::Mainnet => &MAINNET,
        }
    }

    /// Explorer page for an account
    pub fn account_url(&self, address: &str) -> String {
        format!("{}/account/{}", self.config().explorer_url, address)
    }

    /// Explorer page for a transaction
    pub fn transaction_url(&self, tx_id: &str) -> String {
        format!("{}/transaction/{}", self.config().explorer_url, tx_id)
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
