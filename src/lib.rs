//! ZeroSum Gaming Arena client
//!
//! Chain access for the ZeroSum Arena game contract on Base, built on top of Alloy.
//!
//! # Features
//!
//! - Network selection between Base mainnet and Base Sepolia (the default)
//! - Read-only providers and contract handles, and a signing wallet client
//! - Live event subscriptions with game filtering, notifications and handlers
//! - Historical event replay with client-side decoding
//!
//! # Example
//!
//! ```rust,no_run
//! use zerosum_arena::*;
//! use alloy::primitives::U256;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let arena = zerosum_arena::config::parse_address("0x5FbDB2315678afecb367f032d93F642f64180aa3")?;
//!     let provider = get_provider(Some(84532)).await?;
//!
//!     // Replay everything game #1 has seen so far
//!     let past = fetch_historical_events(&provider, arena, Some(U256::from(1)), LogRange::since(0)).await?;
//!     println!("{} past events", past.len());
//!
//!     // React to new ones until the handle is dropped
//!     let _handle = EventWatcher::new(provider, arena)
//!         .with_game_id(Some(U256::from(1)))
//!         .on_event(|event| println!("{} in block {:?}", event.kind, event.block_number))
//!         .watch()
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod history;
pub mod network;
pub mod notify;
pub mod provider;
pub mod wallet;
pub mod watcher;

// Re-export commonly used types
pub use contract::{ZeroSumArena, ZeroSumArenaEvents, ZeroSumArenaInstance};
pub use error::{ArenaError, Result};
pub use events::{decode_log, EventKind, GameEvent};
pub use history::{decode_history, fetch_historical_events, LogRange};
pub use network::{Network, DEFAULT_NETWORK};
pub use notify::{BroadcastNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use provider::{get_contract, get_provider, get_provider_with_url, ArenaReader, ReadProvider};
pub use wallet::{get_wallet_client, get_wallet_client_with_url, WalletClient, WalletProvider};
pub use watcher::{
    game_refresher, watch_game, EventDispatcher, EventHandler, EventWatcher, SubscriptionProtocol,
    WatchHandle, WatchOptions,
};
