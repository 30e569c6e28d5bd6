//! Error types for the arena client library

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Address string is not a valid 20-byte hex address
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Private key is not a valid hex-encoded secp256k1 key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Write path requested without a configured signer
    #[error("No wallet signer configured")]
    MissingSigner,

    /// RPC transport or JSON-RPC error
    #[error("RPC error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),

    /// Contract call or transaction submission error
    #[error("Contract error: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// ABI decoding error
    #[error("Decoding error: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    /// Log topic0 matches none of the arena events
    #[error("Unknown event signature {0:#x}")]
    UnknownEvent(alloy::primitives::B256),

    /// Waiting for a transaction receipt failed
    #[error("Pending transaction error: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    /// Live subscription could not be established
    #[error("Subscription error: {0}")]
    Subscription(String),
}
