//! Core relay implementation split into focused submodules.
//!
//! The `WallRelay` struct and its methods are organized by domain:
//! - [`lifecycle`] - Start/stop/restart coordination
//! - [`poller`] - Fixed-interval polling loop
//! - [`forwarder`] - Single poll pass: fetch, dedup, forward
//! - [`status`] - Status snapshot reporting

mod forwarder;
mod lifecycle;
mod poller;
mod status;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::delivery::{PhotoSink, TelegramChannelClient};
use crate::error::Result;
use crate::feed::{VkWallClient, WallFeed};
use crate::ledger::SeenLedger;
use crate::types::{RunState, RunStats};

use poller::PollerHandle;

/// Run state, dedup ledger, and counters shared across tasks
#[derive(Clone)]
pub(crate) struct PipelineState {
    /// Current lifecycle state of the polling pipeline
    pub(crate) run_state: std::sync::Arc<tokio::sync::RwLock<RunState>>,
    /// Post ids already processed, plus the highest-id watermark
    pub(crate) ledger: std::sync::Arc<tokio::sync::Mutex<SeenLedger>>,
    /// Counters and timestamps exposed through status reporting
    pub(crate) stats: std::sync::Arc<tokio::sync::Mutex<RunStats>>,
    /// Handle of the spawned polling loop (None while stopped)
    pub(crate) poller: std::sync::Arc<tokio::sync::Mutex<Option<PollerHandle>>>,
    /// Serializes poll passes so scheduled and manual checks never interleave
    pub(crate) tick_lock: std::sync::Arc<tokio::sync::Mutex<()>>,
    /// Serializes start/stop transitions so concurrent control commands
    /// observe each other's completed transition, never a half-made one
    pub(crate) lifecycle_lock: std::sync::Arc<tokio::sync::Mutex<()>>,
}

impl PipelineState {
    fn new() -> Self {
        Self {
            run_state: std::sync::Arc::new(tokio::sync::RwLock::new(RunState::Stopped)),
            ledger: std::sync::Arc::new(tokio::sync::Mutex::new(SeenLedger::new())),
            stats: std::sync::Arc::new(tokio::sync::Mutex::new(RunStats::default())),
            poller: std::sync::Arc::new(tokio::sync::Mutex::new(None)),
            tick_lock: std::sync::Arc::new(tokio::sync::Mutex::new(())),
            lifecycle_lock: std::sync::Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// Main relay instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct WallRelay {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<crate::types::Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: std::sync::Arc<Config>,
    /// Source of wall posts (trait object for pluggable implementations)
    pub(crate) feed: std::sync::Arc<dyn WallFeed>,
    /// Destination for forwarded photos (trait object for pluggable implementations)
    pub(crate) sink: std::sync::Arc<dyn PhotoSink>,
    /// Run state, dedup ledger, and counters
    pub(crate) pipeline: PipelineState,
}

impl WallRelay {
    /// Create a new relay backed by the stock VK and Telegram clients.
    ///
    /// The HTTP clients are built from the `feed` and `delivery` sections of the
    /// configuration. Construction fails if either section is missing required
    /// credentials or carries an unparseable API base URL.
    ///
    /// The relay starts in the `Stopped` state; call [`start`](Self::start) to
    /// begin polling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::error::Error::Config) if the feed or
    /// delivery configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wallgram::{Config, WallRelay};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut config = Config::default();
    ///     config.feed.access_token = "vk-service-token".into();
    ///     config.feed.group_id = 123_456;
    ///     config.delivery.bot_token = "123456:bot-token".into();
    ///     config.delivery.channel_id = "@my_channel".into();
    ///
    ///     let relay = WallRelay::new(config)?;
    ///     relay.start().await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        let feed = std::sync::Arc::new(VkWallClient::new(&config.feed)?);
        let sink = std::sync::Arc::new(TelegramChannelClient::new(&config.delivery)?);
        Ok(Self::with_clients(config, feed, sink))
    }

    /// Create a relay over caller-supplied feed and sink implementations.
    ///
    /// Used by tests to inject mock clients, and by embedders that forward from
    /// or to something other than VK and Telegram.
    pub fn with_clients(
        config: Config,
        feed: std::sync::Arc<dyn WallFeed>,
        sink: std::sync::Arc<dyn PhotoSink>,
    ) -> Self {
        let (event_tx, _) = tokio::sync::broadcast::channel(1000);

        Self {
            event_tx,
            config: std::sync::Arc::new(config),
            feed,
            sink,
            pipeline: PipelineState::new(),
        }
    }

    /// Subscribe to relay events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events
    /// independently. Events are buffered, but if a subscriber falls behind by
    /// more than 1000 events, it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wallgram::{Config, WallRelay};
    ///
    /// # fn example(relay: WallRelay) {
    /// let mut events = relay.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         tracing::info!(?event, "relay event");
    ///     }
    /// });
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<crate::types::Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> std::sync::Arc<Config> {
        std::sync::Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped
    /// (ok() converts Err to None). Forwarding continues even when no one
    /// is listening.
    pub(crate) fn emit_event(&self, event: crate::types::Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with polling and listens on the configured
    /// bind address (default: 127.0.0.1:3000).
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let relay = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(relay, config).await })
    }
}
