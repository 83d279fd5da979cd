//! Destination channel access for the relay.
//!
//! Mirrors `feed`: a capability trait ([`PhotoSink`], "push one photo by
//! URL, optionally captioned") and the stock implementation against the
//! Telegram Bot API ([`TelegramChannelClient`], `sendPhoto`). The pipeline
//! depends only on the trait.

use crate::config::DeliveryConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Capability contract for the destination side: deliver a single photo.
#[async_trait]
pub trait PhotoSink: Send + Sync {
    /// Push one photo to the channel. `caption` accompanies the photo when
    /// present; pacing between calls is the caller's responsibility.
    ///
    /// # Errors
    /// Returns [`Error::Delivery`] when the destination is unreachable or
    /// rejects the photo.
    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()>;
}

/// Telegram Bot API `sendPhoto` client for a single channel.
pub struct TelegramChannelClient {
    /// HTTP client for calling the Bot API
    http_client: reqwest::Client,

    /// Fully resolved `sendPhoto` endpoint (embeds the bot token)
    method_url: Url,

    /// Channel the photos are posted into
    chat_id: String,
}

/// Wire request for `sendPhoto`; Telegram fetches the photo from the URL
/// server-side.
#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: &'a str,
    photo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

/// Wire response envelope shared by all Bot API methods.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
}

impl TelegramChannelClient {
    /// Create a client from the delivery configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the bot token or channel id is missing
    /// or the API base URL does not parse, and [`Error::Network`] when the
    /// HTTP client cannot be built.
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        if config.bot_token.is_empty() {
            return Err(Error::Config {
                message: "delivery bot token is not set".into(),
                key: Some("delivery.bot_token".into()),
            });
        }
        if config.channel_id.is_empty() {
            return Err(Error::Config {
                message: "delivery channel id is not set".into(),
                key: Some("delivery.channel_id".into()),
            });
        }

        let base = Url::parse(&config.api_base).map_err(|e| Error::Config {
            message: format!("invalid delivery API base URL: {e}"),
            key: Some("delivery.api_base".into()),
        })?;
        let method_url = base
            .join(&format!("bot{}/sendPhoto", config.bot_token))
            .map_err(|e| Error::Config {
                message: format!("invalid delivery API base URL: {e}"),
                key: Some("delivery.api_base".into()),
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("wallgram/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            method_url,
            chat_id: config.channel_id.clone(),
        })
    }
}

#[async_trait]
impl PhotoSink for TelegramChannelClient {
    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()> {
        // Log the chat id, never the method URL: it embeds the bot token
        debug!(chat_id = %self.chat_id, captioned = caption.is_some(), "sending photo");

        let request = SendPhotoRequest {
            chat_id: &self.chat_id,
            photo: photo_url,
            caption,
        };

        let response = self
            .http_client
            .post(self.method_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("failed to send photo: {e}")))?;

        let status = response.status();
        let body: BotApiResponse = match response.json().await {
            Ok(body) => body,
            // Rejections still carry a JSON body; fall back to the status
            // code when even that is unreadable
            Err(_) if !status.is_success() => {
                return Err(Error::Delivery(format!(
                    "sendPhoto returned HTTP {}",
                    status.as_u16()
                )));
            }
            Err(e) => {
                return Err(Error::Delivery(format!(
                    "failed to decode sendPhoto response: {e}"
                )));
            }
        };

        if !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(Error::Delivery(format!("sendPhoto failed: {description}")));
        }

        Ok(())
    }
}
