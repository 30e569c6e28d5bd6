use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::error::{ArenaError, Result};
use crate::network::Network;
use crate::watcher::{SubscriptionProtocol, WatchOptions, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Clone, Deserialize)]
pub struct AppCfg {
    #[serde(default)]
    pub network: NetworkCfg,
    pub contract: ContractCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    #[serde(default)]
    pub watcher: WatcherCfg,
    #[serde(default)]
    pub logging: LoggingCfg,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkCfg {
    pub chain_id: Option<u64>,
    /// Overrides the built-in endpoint of the selected network
    pub rpc_url: Option<String>,
    pub ws_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractCfg {
    pub address: String,
}

#[derive(Clone, Default, Deserialize)]
pub struct WalletCfg {
    pub private_key: Option<String>,
}

// keep the key out of logs
impl std::fmt::Debug for WalletCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletCfg")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatcherCfg {
    pub game_id: Option<u64>,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    pub protocol: Option<String>, // "ws" or "http", "http" when absent
    pub poll_interval_secs: Option<u64>,
}

impl Default for WatcherCfg {
    fn default() -> Self {
        Self {
            game_id: None,
            notifications: default_notifications(),
            protocol: None,
            poll_interval_secs: None,
        }
    }
}

fn default_notifications() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingCfg {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingCfg {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppCfg {
    /// Load `config.toml` (or `path`), then `ZEROSUM_*` environment overrides
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenv::dotenv().ok();

        let file = match path {
            Some(path) => config::File::with_name(path),
            None => config::File::with_name("config.toml").required(false),
        };

        let config_builder = config::Config::builder()
            .add_source(file)
            // Add environment variables with prefix "ZEROSUM_", e.g. ZEROSUM_WALLET__PRIVATE_KEY
            .add_source(
                config::Environment::with_prefix("ZEROSUM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppCfg = config_builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: AppCfg = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.contract_address()?;
        self.subscription_protocol()?;
        Ok(())
    }

    pub fn network(&self) -> Network {
        Network::from_chain_id(self.network.chain_id)
    }

    /// Endpoint for queries and transactions
    pub fn rpc_url(&self) -> String {
        self.network
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.network().rpc_url().to_string())
    }

    /// Endpoint for live subscriptions: the ws url when subscribing over ws
    pub fn subscription_url(&self) -> Result<String> {
        match self.subscription_protocol()? {
            SubscriptionProtocol::Ws => self.network.ws_url.clone().ok_or_else(|| {
                ArenaError::Subscription("watcher.protocol is \"ws\" but network.ws_url is not set".to_string())
            }),
            SubscriptionProtocol::Http => Ok(self.rpc_url()),
        }
    }

    pub fn contract_address(&self) -> Result<Address> {
        parse_address(&self.contract.address)
    }

    pub fn subscription_protocol(&self) -> Result<SubscriptionProtocol> {
        self.watcher
            .protocol
            .as_deref()
            .map(SubscriptionProtocol::from_str)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn watch_options(&self) -> Result<WatchOptions> {
        Ok(WatchOptions {
            game_id: self.watcher.game_id.map(U256::from),
            show_notifications: self.watcher.notifications,
            protocol: self.subscription_protocol()?,
            poll_interval: self
                .watcher
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        })
    }
}

pub fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s.trim()).map_err(|_| ArenaError::InvalidAddress(s.to_string()))
}
