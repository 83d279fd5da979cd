//! Source wall access for the relay.
//!
//! This module defines the capability the pipeline needs from the source
//! side ([`WallFeed`], "fetch the N most recent posts") and the stock
//! implementation of it against the VK API ([`VkWallClient`], `wall.get`).
//! The pipeline only ever talks to the trait, so alternative sources and
//! test doubles plug in without touching the core.

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::types::{Attachment, PhotoAttachment, PhotoSize, PostId, WallPost};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Capability contract for the source side: fetch the most recent posts.
#[async_trait]
pub trait WallFeed: Send + Sync {
    /// Fetch up to `count` of the most recent posts, newest first as
    /// reported by the source.
    ///
    /// # Errors
    /// Returns [`Error::Feed`] when the source is unreachable, rejects the
    /// request, or returns an unusable payload.
    async fn recent_posts(&self, count: usize) -> Result<Vec<WallPost>>;
}

/// VK `wall.get` client for a single community wall.
///
/// Stateless besides the shared HTTP connection pool; safe to share via
/// `Arc` and call from any task.
#[derive(Debug)]
pub struct VkWallClient {
    /// HTTP client for calling the VK API
    http_client: reqwest::Client,

    /// Fully resolved `wall.get` endpoint
    method_url: Url,

    /// Access token sent with every request
    access_token: String,

    /// Wall owner id as the API expects it (negative for communities)
    owner_id: i64,

    /// API version sent with every request
    api_version: String,
}

impl VkWallClient {
    /// Create a client from the feed configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the access token or group id is
    /// missing or the API base URL does not parse, and [`Error::Network`]
    /// when the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(Error::Config {
                message: "feed access token is not set".into(),
                key: Some("feed.access_token".into()),
            });
        }
        if config.group_id == 0 {
            return Err(Error::Config {
                message: "feed group id is not set".into(),
                key: Some("feed.group_id".into()),
            });
        }

        let base = Url::parse(&config.api_base).map_err(|e| Error::Config {
            message: format!("invalid feed API base URL: {e}"),
            key: Some("feed.api_base".into()),
        })?;
        let method_url = base.join("method/wall.get").map_err(|e| Error::Config {
            message: format!("invalid feed API base URL: {e}"),
            key: Some("feed.api_base".into()),
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("wallgram/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            method_url,
            access_token: config.access_token.clone(),
            // Community walls are addressed with a negated id
            owner_id: -config.group_id.abs(),
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl WallFeed for VkWallClient {
    async fn recent_posts(&self, count: usize) -> Result<Vec<WallPost>> {
        debug!(owner_id = self.owner_id, count, "fetching wall page");

        let response = self
            .http_client
            .get(self.method_url.clone())
            .query(&[
                ("owner_id", self.owner_id.to_string()),
                ("count", count.to_string()),
                ("access_token", self.access_token.clone()),
                ("v", self.api_version.clone()),
            ])
            .send()
            .await
            .map_err(|e| Error::Feed(format!("failed to fetch wall: {e}")))?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!(
                "wall.get returned HTTP {}",
                status.as_u16()
            )));
        }

        let envelope: VkEnvelope = response
            .json()
            .await
            .map_err(|e| Error::Feed(format!("failed to decode wall.get response: {e}")))?;

        // The VK API reports failures as 200 OK with an error object
        if let Some(error) = envelope.error {
            return Err(Error::Feed(format!(
                "wall.get failed: {} (code {})",
                error.error_msg, error.error_code
            )));
        }

        let page = envelope
            .response
            .ok_or_else(|| Error::Feed("wall.get returned neither response nor error".into()))?;

        Ok(page.items.into_iter().map(WallPost::from).collect())
    }
}

// -----------------------------------------------------------------------
// VK wire format
//
// Private DTOs for the slice of the wall.get response the relay consumes;
// converted to crate types at this boundary and never exposed.
// -----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VkEnvelope {
    response: Option<VkWallPage>,
    error: Option<VkApiError>,
}

#[derive(Debug, Deserialize)]
struct VkApiError {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct VkWallPage {
    #[serde(default)]
    items: Vec<VkWallItem>,
}

#[derive(Debug, Deserialize)]
struct VkWallItem {
    id: i64,
    #[serde(default)]
    date: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    attachments: Vec<VkAttachment>,
}

#[derive(Debug, Deserialize)]
struct VkAttachment {
    #[serde(rename = "type")]
    kind: String,
    photo: Option<VkPhoto>,
}

#[derive(Debug, Deserialize)]
struct VkPhoto {
    #[serde(default)]
    sizes: Vec<VkPhotoSize>,
}

#[derive(Debug, Deserialize)]
struct VkPhotoSize {
    // Old uploads can omit dimensions; they then never win the size pick
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    url: String,
}

impl From<VkWallItem> for WallPost {
    fn from(item: VkWallItem) -> Self {
        let attachments = item
            .attachments
            .into_iter()
            .map(|attachment| match (attachment.kind.as_str(), attachment.photo) {
                ("photo", Some(photo)) => Attachment::Photo(PhotoAttachment {
                    sizes: photo
                        .sizes
                        .into_iter()
                        .map(|size| PhotoSize {
                            width: size.width,
                            height: size.height,
                            url: size.url,
                        })
                        .collect(),
                }),
                _ => Attachment::Other,
            })
            .collect();

        WallPost {
            id: PostId(item.id),
            published_at: DateTime::from_timestamp(item.date, 0).unwrap_or_default(),
            text: item.text,
            attachments,
        }
    }
}
