//! Network selection between Base mainnet and the Base Sepolia testnet

use std::fmt;

use serde::{Deserialize, Serialize};

pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

pub const BASE_MAINNET_RPC_URL: &str = "https://mainnet.base.org";
pub const BASE_SEPOLIA_RPC_URL: &str = "https://sepolia.base.org";

/// Network used when no chain id is supplied
pub const DEFAULT_NETWORK: Network = Network::BaseSepolia;

/// One of the two networks the arena contract is deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    BaseMainnet,
    BaseSepolia,
}

impl Network {
    /// Select a network from an optional chain id.
    ///
    /// Only the mainnet chain id selects mainnet; everything else,
    /// including `None`, falls back to the testnet.
    pub fn from_chain_id(chain_id: Option<u64>) -> Self {
        match chain_id {
            Some(BASE_MAINNET_CHAIN_ID) => Network::BaseMainnet,
            _ => DEFAULT_NETWORK,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::BaseMainnet => BASE_MAINNET_CHAIN_ID,
            Network::BaseSepolia => BASE_SEPOLIA_CHAIN_ID,
        }
    }

    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::BaseMainnet => BASE_MAINNET_RPC_URL,
            Network::BaseSepolia => BASE_SEPOLIA_RPC_URL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::BaseMainnet => "base",
            Network::BaseSepolia => "base-sepolia",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::BaseSepolia)
    }
}

impl Default for Network {
    fn default() -> Self {
        DEFAULT_NETWORK
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.chain_id())
    }
}
