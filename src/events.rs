//! Normalized arena event records decoded from contract logs

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, B256, TxHash, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::{SolEvent, SolEventInterface};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::{ZeroSumArena, ZeroSumArenaEvents};
use crate::error::{ArenaError, Result};

/// The six events emitted by the arena contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    GameCreated,
    PlayerJoined,
    MoveMade,
    GameFinished,
    GameCancelled,
    PrizeClaimed,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::GameCreated,
        EventKind::PlayerJoined,
        EventKind::MoveMade,
        EventKind::GameFinished,
        EventKind::GameCancelled,
        EventKind::PrizeClaimed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GameCreated => "GameCreated",
            EventKind::PlayerJoined => "PlayerJoined",
            EventKind::MoveMade => "MoveMade",
            EventKind::GameFinished => "GameFinished",
            EventKind::GameCancelled => "GameCancelled",
            EventKind::PrizeClaimed => "PrizeClaimed",
        }
    }

    /// Topic0 of the event, i.e. keccak256 of its canonical signature
    pub fn signature(&self) -> B256 {
        match self {
            EventKind::GameCreated => ZeroSumArena::GameCreated::SIGNATURE_HASH,
            EventKind::PlayerJoined => ZeroSumArena::PlayerJoined::SIGNATURE_HASH,
            EventKind::MoveMade => ZeroSumArena::MoveMade::SIGNATURE_HASH,
            EventKind::GameFinished => ZeroSumArena::GameFinished::SIGNATURE_HASH,
            EventKind::GameCancelled => ZeroSumArena::GameCancelled::SIGNATURE_HASH,
            EventKind::PrizeClaimed => ZeroSumArena::PrizeClaimed::SIGNATURE_HASH,
        }
    }

    pub fn from_signature(signature: B256) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.signature() == signature)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded arena event in a uniform shape.
///
/// `args` maps each solidity parameter name to its value: integers are
/// decimal strings, addresses are checksummed hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub kind: EventKind,
    pub game_id: U256,
    pub args: Map<String, Value>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<TxHash>,
}

impl GameEvent {
    /// `true` when no target game is set or the ids are equal
    pub fn matches_game(&self, game_id: Option<U256>) -> bool {
        game_id.is_none_or(|id| id == self.game_id)
    }

    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    /// The address acting in this event: creator, player or winner
    pub fn player(&self) -> Option<Address> {
        ["creator", "player", "winner"]
            .into_iter()
            .find_map(|name| self.arg_str(name))
            .and_then(|s| Address::from_str(s).ok())
    }
}

/// Decode an RPC log against the arena event interface
pub fn decode_log(log: &Log) -> Result<GameEvent> {
    let topic0 = log.topics().first().copied().unwrap_or_default();
    let Some(kind) = EventKind::from_signature(topic0) else {
        return Err(ArenaError::UnknownEvent(topic0));
    };

    let decoded = ZeroSumArenaEvents::decode_raw_log(log.topics(), &log.data().data)?;

    let (game_id, args) = match decoded {
        ZeroSumArenaEvents::GameCreated(ev) => (
            ev.gameId,
            args([
                ("gameId", uint(ev.gameId)),
                ("creator", address(ev.creator)),
                ("entryFee", uint(ev.entryFee)),
                ("maxPlayers", uint(ev.maxPlayers)),
            ]),
        ),
        ZeroSumArenaEvents::PlayerJoined(ev) => (
            ev.gameId,
            args([
                ("gameId", uint(ev.gameId)),
                ("player", address(ev.player)),
                ("playerCount", uint(ev.playerCount)),
            ]),
        ),
        ZeroSumArenaEvents::MoveMade(ev) => (
            ev.gameId,
            args([
                ("gameId", uint(ev.gameId)),
                ("player", address(ev.player)),
                ("moveValue", uint(ev.moveValue)),
            ]),
        ),
        ZeroSumArenaEvents::GameFinished(ev) => (
            ev.gameId,
            args([
                ("gameId", uint(ev.gameId)),
                ("winner", address(ev.winner)),
                ("prize", uint(ev.prize)),
            ]),
        ),
        ZeroSumArenaEvents::GameCancelled(ev) => (
            ev.gameId,
            args([("gameId", uint(ev.gameId)), ("reason", Value::String(ev.reason))]),
        ),
        ZeroSumArenaEvents::PrizeClaimed(ev) => (
            ev.gameId,
            args([
                ("gameId", uint(ev.gameId)),
                ("player", address(ev.player)),
                ("amount", uint(ev.amount)),
            ]),
        ),
    };

    Ok(GameEvent {
        kind,
        game_id,
        args,
        block_number: log.block_number,
        transaction_hash: log.transaction_hash,
    })
}

fn args<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn uint(value: U256) -> Value {
    Value::String(value.to_string())
}

fn address(value: Address) -> Value {
    Value::String(value.to_checksum(None))
}
