//! Live subscriptions to arena events.
//!
//! One subscription is registered per event kind. Every incoming batch of
//! logs goes through an [`EventDispatcher`], which filters by game id,
//! raises notifications and invokes the caller's handler. Subscriptions are
//! owned by a [`WatchHandle`] and end when it is stopped or dropped.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::error::{ArenaError, Result};
use crate::events::{decode_log, EventKind, GameEvent};
use crate::notify::{Notification, Notifier, TracingNotifier};

/// Caller-supplied reaction to a forwarded event
pub type EventHandler = Arc<dyn Fn(&GameEvent) + Send + Sync>;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// How new logs reach the watcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionProtocol {
    /// `eth_subscribe` push over a websocket
    Ws,
    /// `eth_newFilter` + `eth_getFilterChanges` polling
    #[default]
    Http,
}

impl FromStr for SubscriptionProtocol {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ws" | "wss" | "websocket" => Ok(SubscriptionProtocol::Ws),
            "http" | "https" | "poll" => Ok(SubscriptionProtocol::Http),
            other => Err(ArenaError::Subscription(format!("unknown subscription protocol '{}'", other))),
        }
    }
}

impl fmt::Display for SubscriptionProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionProtocol::Ws => f.write_str("ws"),
            SubscriptionProtocol::Http => f.write_str("http"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Only forward events of this game
    pub game_id: Option<U256>,
    pub show_notifications: bool,
    pub protocol: SubscriptionProtocol,
    /// Filter polling interval, HTTP only
    pub poll_interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            game_id: None,
            show_notifications: true,
            protocol: SubscriptionProtocol::Http,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Turns raw log batches into forwarded [`GameEvent`]s
pub struct EventDispatcher {
    address: Address,
    game_id: Option<U256>,
    show_notifications: bool,
    notifier: Arc<dyn Notifier>,
    handler: Option<EventHandler>,
}

impl EventDispatcher {
    /// Process one batch in arrival order and return the forwarded events.
    ///
    /// Logs from other addresses, logs that fail to decode and logs of
    /// other games are dropped before any notification or handler call.
    pub fn dispatch(&self, logs: &[Log]) -> Vec<GameEvent> {
        let mut forwarded = Vec::with_capacity(logs.len());

        for log in logs {
            if log.address() != self.address {
                trace!("Skipping log from foreign contract {}", log.address());
                continue;
            }

            let event = match decode_log(log) {
                Ok(event) => event,
                Err(e) => {
                    debug!("Skipping undecodable log {:?}: {}", log.transaction_hash, e);
                    continue;
                }
            };

            if !event.matches_game(self.game_id) {
                trace!("Skipping {} for game #{}", event.kind, event.game_id);
                continue;
            }

            debug!(
                "Received {} for game #{} at block {:?}",
                event.kind, event.game_id, event.block_number
            );

            if self.show_notifications {
                self.notifier.notify(&Notification::from_event(&event));
            }
            if let Some(handler) = &self.handler {
                handler(&event);
            }

            forwarded.push(event);
        }

        forwarded
    }
}

/// Builder for a set of live arena event subscriptions
pub struct EventWatcher<P> {
    provider: P,
    address: Address,
    options: WatchOptions,
    notifier: Arc<dyn Notifier>,
    handler: Option<EventHandler>,
}

impl<P: Provider> EventWatcher<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self {
            provider,
            address,
            options: WatchOptions::default(),
            notifier: Arc::new(TracingNotifier),
            handler: None,
        }
    }

    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_game_id(mut self, game_id: Option<U256>) -> Self {
        self.options.game_id = game_id;
        self
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.options.show_notifications = enabled;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn on_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher {
            address: self.address,
            game_id: self.options.game_id,
            show_notifications: self.options.show_notifications,
            notifier: Arc::clone(&self.notifier),
            handler: self.handler.clone(),
        }
    }

    /// Register one subscription per event kind and start dispatching.
    ///
    /// If any subscription fails, the ones already started are torn down
    /// and the error is returned.
    pub async fn watch(self) -> Result<WatchHandle> {
        let dispatcher = Arc::new(self.dispatcher());
        let mut handle = WatchHandle { tasks: Vec::with_capacity(EventKind::ALL.len()) };

        for kind in EventKind::ALL {
            let filter = Filter::new().address(self.address).event_signature(kind.signature());
            let mut stream = self.open_stream(&filter).await.inspect_err(|e| {
                error!("Failed to subscribe to {} events of {}: {}", kind, self.address, e);
            })?;
            info!("Subscribed to {} events of {} over {}", kind, self.address, self.options.protocol);

            let dispatcher = Arc::clone(&dispatcher);
            handle.tasks.push(tokio::spawn(async move {
                while let Some(batch) = stream.next().await {
                    let forwarded = dispatcher.dispatch(&batch);
                    trace!("{} batch: {} logs, {} forwarded", kind, batch.len(), forwarded.len());
                }
                warn!("{} subscription stream ended", kind);
            }));
        }

        Ok(handle)
    }

    async fn open_stream(&self, filter: &Filter) -> Result<BoxStream<'static, Vec<Log>>> {
        match self.options.protocol {
            SubscriptionProtocol::Ws => {
                let sub = self.provider.subscribe_logs(filter).await?;
                Ok(sub.into_stream().map(|log| vec![log]).boxed())
            }
            SubscriptionProtocol::Http => {
                let poller = self.provider.watch_logs(filter).await?;
                Ok(poller.with_poll_interval(self.options.poll_interval).into_stream().boxed())
            }
        }
    }
}

/// Watcher that calls `refresh` on any event of `game_id`, without notifications
pub fn game_refresher<P, F>(provider: P, address: Address, game_id: U256, refresh: F) -> EventWatcher<P>
where
    P: Provider,
    F: Fn() + Send + Sync + 'static,
{
    EventWatcher::new(provider, address)
        .with_game_id(Some(game_id))
        .with_notifications(false)
        .on_event(move |_| refresh())
}

/// Start a [`game_refresher`] over `protocol`
pub async fn watch_game<P, F>(
    provider: P,
    address: Address,
    game_id: U256,
    protocol: SubscriptionProtocol,
    refresh: F,
) -> Result<WatchHandle>
where
    P: Provider,
    F: Fn() + Send + Sync + 'static,
{
    let mut watcher = game_refresher(provider, address, game_id, refresh);
    watcher.options.protocol = protocol;
    watcher.watch().await
}

/// Owns the subscription tasks; dropping it ends the subscriptions
pub struct WatchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn subscription_count(&self) -> usize {
        self.tasks.len()
    }

    /// `true` while at least one subscription is still running
    pub fn is_active(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }

    pub fn stop(self) {
        drop(self)
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ZeroSumArena;
    use crate::notify::BroadcastNotifier;
    use crate::provider::{get_provider_with_url, ReadProvider};
    use alloy::primitives::{address, LogData, B256};
    use alloy::sol_types::SolEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ARENA: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    const PLAYER: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn rpc_log(address: Address, data: LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_number: Some(100),
            ..Default::default()
        }
    }

    fn joined(game_id: u64) -> Log {
        let data = ZeroSumArena::PlayerJoined {
            gameId: U256::from(game_id),
            player: PLAYER,
            playerCount: U256::from(2),
        }
        .encode_log_data();
        rpc_log(ARENA, data)
    }

    async fn watcher() -> EventWatcher<ReadProvider> {
        let provider = get_provider_with_url("http://localhost:8545").await.unwrap();
        EventWatcher::new(provider, ARENA)
    }

    #[tokio::test]
    async fn test_non_matching_game_never_reaches_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let dispatcher = watcher()
            .await
            .with_game_id(Some(U256::from(5)))
            .with_notifications(false)
            .on_event(move |event| sink.lock().unwrap().push(event.game_id))
            .dispatcher();

        let forwarded = dispatcher.dispatch(&[joined(4), joined(5), joined(6), joined(5)]);

        assert_eq!(forwarded.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![U256::from(5), U256::from(5)]);
    }

    #[tokio::test]
    async fn test_without_game_filter_everything_is_forwarded() {
        let dispatcher = watcher().await.with_notifications(false).dispatcher();
        let forwarded = dispatcher.dispatch(&[joined(1), joined(2)]);
        assert_eq!(forwarded.len(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_and_foreign_logs_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let dispatcher = watcher()
            .await
            .with_notifications(false)
            .on_event(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .dispatcher();

        let garbage = rpc_log(ARENA, LogData::new_unchecked(vec![B256::repeat_byte(0x42)], Default::default()));
        let mut foreign = joined(1);
        foreign.inner.address = PLAYER;

        let forwarded = dispatcher.dispatch(&[garbage, foreign, joined(1)]);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notifications_follow_the_flag() {
        let notifier = Arc::new(BroadcastNotifier::new(16));
        let mut rx = notifier.subscribe();

        let quiet = watcher().await.with_notifications(false).with_notifier(notifier.clone()).dispatcher();
        quiet.dispatch(&[joined(1)]);
        assert!(rx.try_recv().is_err());

        let loud = watcher().await.with_notifier(notifier.clone()).dispatcher();
        loud.dispatch(&[joined(1)]);
        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.title, "Player joined");
        assert_eq!(notification.game_id, U256::from(1));
    }

    #[tokio::test]
    async fn test_game_refresher_triggers_on_its_game_only() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&refreshes);

        let provider = get_provider_with_url("http://localhost:8545").await.unwrap();
        let refresher = game_refresher(provider, ARENA, U256::from(3), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!refresher.options().show_notifications);

        refresher.dispatcher().dispatch(&[joined(3), joined(4), joined(3)]);
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_watch_fails_when_endpoint_is_unreachable() {
        let provider = get_provider_with_url("http://127.0.0.1:1").await.unwrap();
        let result = EventWatcher::new(provider, ARENA).watch().await;
        assert!(result.is_err());
    }

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("ws".parse::<SubscriptionProtocol>().unwrap(), SubscriptionProtocol::Ws);
        assert_eq!("HTTP".parse::<SubscriptionProtocol>().unwrap(), SubscriptionProtocol::Http);
        assert!("carrier-pigeon".parse::<SubscriptionProtocol>().is_err());
        assert_eq!(SubscriptionProtocol::default(), SubscriptionProtocol::Http);
    }
}
