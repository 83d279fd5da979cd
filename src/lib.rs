//! # wallgram
//!
//! Backend library that relays photos from a VK community wall to a
//! Telegram channel.
//!
//! ## Design Philosophy
//!
//! wallgram is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **At-most-once** - A post is attempted once; failures never cause reposts
//! - **Sensible defaults** - Works out of the box with just credentials
//!
//! ## Quick Start
//!
//! ```no_run
//! use wallgram::{Config, WallRelay};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.feed.access_token = "vk-service-token".to_string();
//!     config.feed.group_id = 123_456;
//!     config.delivery.bot_token = "123456:bot-token".to_string();
//!     config.delivery.channel_id = "@my_channel".to_string();
//!
//!     let relay = WallRelay::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = relay.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     relay.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Photo delivery to the destination channel
pub mod delivery;
/// Error types
pub mod error;
/// Wall feed access
pub mod feed;
/// Seen-post ledger for new-post detection
pub mod ledger;
/// Core relay implementation (decomposed into focused submodules)
pub mod relay;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, DeliveryConfig, FeedConfig, RelayConfig};
pub use delivery::{PhotoSink, TelegramChannelClient};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use feed::{VkWallClient, WallFeed};
pub use ledger::SeenLedger;
pub use relay::WallRelay;
pub use types::{
    Attachment, Event, PhotoAttachment, PhotoSize, PostId, RunState, RunStats, StatusSnapshot,
    TickOutcome, WallPost,
};

/// Helper function to run the relay with graceful signal handling.
///
/// Starts the pipeline and the REST API server, waits for a termination
/// signal, then stops the pipeline and emits [`Event::Shutdown`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use wallgram::{Config, WallRelay, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut config = Config::default();
///     config.feed.access_token = "vk-service-token".to_string();
///     config.feed.group_id = 123_456;
///     config.delivery.bot_token = "123456:bot-token".to_string();
///     config.delivery.channel_id = "@my_channel".to_string();
///
///     let relay = WallRelay::new(config)?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(relay).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(relay: WallRelay) -> Result<()> {
    relay.start().await?;
    let api_handle = relay.spawn_api_server();

    wait_for_signal().await;

    relay.emit_event(Event::Shutdown);
    relay.stop().await?;
    api_handle.abort();
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
