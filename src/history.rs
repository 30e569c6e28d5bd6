//! Historical event replay

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{BlockNumberOrTag, Filter, FilterBlockOption, Log};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::events::{decode_log, GameEvent};

/// Block range of a log query; an open end means up to the latest block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogRange {
    pub from_block: u64,
    pub to_block: Option<u64>,
}

impl LogRange {
    pub fn new(from_block: u64, to_block: Option<u64>) -> Self {
        Self { from_block, to_block }
    }

    pub fn since(from_block: u64) -> Self {
        Self { from_block, to_block: None }
    }
}

impl From<LogRange> for FilterBlockOption {
    fn from(value: LogRange) -> Self {
        FilterBlockOption::Range {
            from_block: Some(BlockNumberOrTag::Number(value.from_block)),
            to_block: Some(value.to_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number)),
        }
    }
}

/// Query all logs of the arena contract in `range` and decode them
pub async fn fetch_historical_events<P: Provider>(
    provider: &P,
    address: Address,
    game_id: Option<U256>,
    range: LogRange,
) -> Result<Vec<GameEvent>> {
    let filter = Filter::new().address(address).select(range);

    let logs = provider.get_logs(&filter).await.inspect_err(|e| {
        error!("Failed to fetch logs of {} in {:?}: {}", address, range, e);
    })?;
    debug!("Received {} logs from {}", logs.len(), address);

    let events = decode_history(&logs, game_id);
    info!("Decoded {} of {} historical logs (game filter: {:?})", events.len(), logs.len(), game_id);
    Ok(events)
}

/// Decode `logs` in order, dropping entries that fail to decode or
/// belong to another game
pub fn decode_history(logs: &[Log], game_id: Option<U256>) -> Vec<GameEvent> {
    logs.iter()
        .filter_map(|log| match decode_log(log) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("Skipping historical log {:?}: {}", log.transaction_hash, e);
                None
            }
        })
        .filter(|event| event.matches_game(game_id))
        .collect()
}
