//! User-facing notifications for arena events

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::events::{EventKind, GameEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub game_id: U256,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Render the fixed template for the event's kind
    pub fn from_event(event: &GameEvent) -> Self {
        let id = event.game_id;
        let actor = event.player().map(short_address).unwrap_or_else(|| "someone".to_string());

        let (level, title, message) = match event.kind {
            EventKind::GameCreated => (
                NotificationLevel::Info,
                "New game",
                format!("Game #{} was created by {}", id, actor),
            ),
            EventKind::PlayerJoined => (
                NotificationLevel::Info,
                "Player joined",
                format!("{} joined game #{}", actor, id),
            ),
            EventKind::MoveMade => (
                NotificationLevel::Info,
                "Move made",
                format!("{} made a move in game #{}", actor, id),
            ),
            EventKind::GameFinished => (
                NotificationLevel::Success,
                "Game finished",
                format!("Game #{} finished. Winner: {}", id, actor),
            ),
            EventKind::GameCancelled => (
                NotificationLevel::Warning,
                "Game cancelled",
                format!(
                    "Game #{} was cancelled: {}",
                    id,
                    event.arg_str("reason").unwrap_or("no reason given")
                ),
            ),
            EventKind::PrizeClaimed => (
                NotificationLevel::Success,
                "Prize claimed",
                format!("{} claimed the prize of game #{}", actor, id),
            ),
        };

        Self {
            level,
            title: title.to_string(),
            message,
            game_id: id,
            created_at: Utc::now(),
        }
    }
}

/// `0x1234...abcd`
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Sink for notifications raised by the event watcher
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes each notification as a structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: &Notification) {
        match n.level {
            NotificationLevel::Warning => {
                warn!(game_id = %n.game_id, title = %n.title, "{}", n.message)
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(game_id = %n.game_id, title = %n.title, level = ?n.level, "{}", n.message)
            }
        }
    }
}

/// Fans notifications out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: &Notification) {
        // no receivers is fine
        let _ = self.sender.send(notification.clone());
    }
}
