//! Configuration types for wallgram

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use utoipa::ToSchema;

/// Top-level configuration
///
/// Plain serde data: every field has a default so a partial JSON/TOML file
/// deserializes cleanly, and `Config::default()` yields a structurally valid
/// (but unstartable) configuration. Mandatory identifiers are checked by
/// [`Config::validate`] when the pipeline starts, not at construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Source wall settings (VK community)
    #[serde(default)]
    pub feed: FeedConfig,

    /// Destination channel settings (Telegram)
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Poll cadence, pacing, and caption shaping
    #[serde(default)]
    pub relay: RelayConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Check that every identifier the adapters need is present.
    ///
    /// Called on entry to `start()`; a missing value aborts the start with a
    /// descriptive error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.feed.access_token.is_empty() {
            return Err(Error::Config {
                message: "feed access token is not set".into(),
                key: Some("feed.access_token".into()),
            });
        }
        if self.feed.group_id == 0 {
            return Err(Error::Config {
                message: "feed group id is not set".into(),
                key: Some("feed.group_id".into()),
            });
        }
        if self.delivery.bot_token.is_empty() {
            return Err(Error::Config {
                message: "delivery bot token is not set".into(),
                key: Some("delivery.bot_token".into()),
            });
        }
        if self.delivery.channel_id.is_empty() {
            return Err(Error::Config {
                message: "delivery channel id is not set".into(),
                key: Some("delivery.channel_id".into()),
            });
        }
        Ok(())
    }
}

/// Source wall configuration (VK community wall)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedConfig {
    /// VK API access token (mandatory to start)
    #[serde(default)]
    pub access_token: String,

    /// Community id whose wall is polled, as a positive number (mandatory to start)
    ///
    /// The VK API addresses community walls with a negative `owner_id`; the
    /// client applies the sign itself.
    #[serde(default)]
    pub group_id: i64,

    /// Base URL of the VK API (default: `https://api.vk.com`)
    ///
    /// Overridable so tests can point the client at a local mock server.
    #[serde(default = "default_vk_api_base")]
    pub api_base: String,

    /// VK API version sent with every request (default: "5.199")
    #[serde(default = "default_vk_api_version")]
    pub api_version: String,

    /// How many of the most recent posts one poll fetches (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_feed_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            group_id: 0,
            api_base: default_vk_api_base(),
            api_version: default_vk_api_version(),
            page_size: default_page_size(),
            request_timeout: default_feed_timeout(),
        }
    }
}

/// Destination channel configuration (Telegram channel)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryConfig {
    /// Telegram bot token (mandatory to start)
    #[serde(default)]
    pub bot_token: String,

    /// Channel to post into: `@username` or a numeric chat id (mandatory to start)
    #[serde(default)]
    pub channel_id: String,

    /// Base URL of the Telegram Bot API (default: `https://api.telegram.org`)
    ///
    /// Overridable so tests can point the client at a local mock server.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds (default: 30)
    ///
    /// Telegram fetches the photo from its URL server-side, so delivery
    /// calls can take noticeably longer than the wall fetch.
    #[serde(default = "default_delivery_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_base: default_telegram_api_base(),
            request_timeout: default_delivery_timeout(),
        }
    }
}

/// Poll cadence, delivery pacing, and caption shaping
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RelayConfig {
    /// Seconds between poll cycles (default: 30)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Seconds to wait between consecutive delivery calls (default: 1)
    ///
    /// Applies per delivery call, including between the last photo of one
    /// post and the first photo of the next, to respect downstream limits.
    #[serde(default = "default_pacing_delay", with = "duration_serde")]
    pub pacing_delay: Duration,

    /// Maximum caption excerpt length in characters (default: 200)
    #[serde(default = "default_caption_limit")]
    pub caption_limit: usize,

    /// Caption text used when a post has no body text (default: "New post")
    #[serde(default = "default_caption_placeholder")]
    pub caption_placeholder: String,

    /// Seconds to wait between stop and start during a restart (default: 1)
    #[serde(default = "default_restart_grace", with = "duration_serde")]
    pub restart_grace: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            pacing_delay: default_pacing_delay(),
            caption_limit: default_caption_limit(),
            caption_placeholder: default_caption_placeholder(),
            restart_grace: default_restart_grace(),
        }
    }
}

/// API and external server integration configuration
///
/// Groups settings for external access and control interfaces.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    ///
    /// When set, every request must carry it in the `X-Api-Key` header; this
    /// is the controller-token gate for the privileged start/stop commands.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

// Default value functions for serde

fn default_vk_api_base() -> String {
    "https://api.vk.com".to_string()
}

fn default_vk_api_version() -> String {
    "5.199".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_delivery_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_pacing_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_caption_limit() -> usize {
    200
}

fn default_caption_placeholder() -> String {
    "New post".to_string()
}

fn default_restart_grace() -> Duration {
    Duration::from_secs(1)
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
