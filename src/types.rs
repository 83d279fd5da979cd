//! Core types for wallgram

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier of a post within the source wall
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl PostId {
    /// Create a new PostId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<PostId> for i64 {
    fn from(id: PostId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for PostId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<PostId> for i64 {
    fn eq(&self, other: &PostId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One size variant of a photo, as published by the source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PhotoSize {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Direct URL of this variant
    pub url: String,
}

/// A photo attachment with its available size variants
///
/// The source reports size variants in arbitrary order; callers pick the
/// variant to deliver with [`PhotoAttachment::largest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PhotoAttachment {
    /// Available size variants, in source order
    pub sizes: Vec<PhotoSize>,
}

impl PhotoAttachment {
    /// The size variant with the greatest width.
    ///
    /// Ties keep the first variant encountered; height is ignored. Returns
    /// `None` when the source reported no sizes at all.
    pub fn largest(&self) -> Option<&PhotoSize> {
        self.sizes.iter().fold(None, |best, candidate| match best {
            Some(current) if candidate.width <= current.width => best,
            _ => Some(candidate),
        })
    }
}

/// A single post attachment
///
/// Only photos are forwarded; every other attachment kind the source can
/// produce (video, audio, doc, link, poll, ...) collapses to `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    /// A photo with its size variants
    Photo(PhotoAttachment),
    /// Any non-photo attachment kind
    Other,
}

/// One post fetched from the source wall
///
/// Ephemeral per tick: posts are read from the feed adapter, processed, and
/// discarded. Only their ids survive, inside the seen ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WallPost {
    /// Post identifier, unique within the wall
    pub id: PostId,

    /// When the post was published
    pub published_at: DateTime<Utc>,

    /// Post body text, possibly empty
    pub text: String,

    /// Attachments in source order
    pub attachments: Vec<Attachment>,
}

impl WallPost {
    /// Iterate over the photo attachments of this post, in source order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoAttachment> {
        self.attachments.iter().filter_map(|a| match a {
            Attachment::Photo(photo) => Some(photo),
            Attachment::Other => None,
        })
    }
}

/// Pipeline run state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not relaying; no poller installed
    #[default]
    Stopped,
    /// Start-up in progress (validation, ledger seeding)
    Starting,
    /// Poller installed and ticking
    Running,
    /// Shutdown in progress; in-flight tick may still be completing
    Stopping,
}

impl RunState {
    /// Lowercase state name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Stopped => "stopped",
            RunState::Starting => "starting",
            RunState::Running => "running",
            RunState::Stopping => "stopping",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters accumulated over one run of the pipeline
///
/// Written by the forwarder (`photos_sent`, `last_poll_at`, `last_seen_id`)
/// and the lifecycle controller (`started_at`); reset by `start()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RunStats {
    /// Photos successfully delivered during this run
    pub photos_sent: u64,

    /// When the current run started, unset while stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the last poll cycle finished processing a page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_poll_at: Option<DateTime<Utc>>,

    /// Highest post id observed so far (0 until a baseline exists)
    pub last_seen_id: PostId,
}

/// Point-in-time view of the pipeline, served to status queries
///
/// Producing a snapshot never fails; every field is derived from in-memory
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusSnapshot {
    /// Current lifecycle state
    pub state: RunState,

    /// Convenience flag, true iff `state` is `running`
    pub running: bool,

    /// Photos successfully delivered during this run
    pub photos_sent: u64,

    /// When the current run started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the last poll cycle completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_poll_at: Option<DateTime<Utc>>,

    /// Highest post id observed so far
    pub last_seen_id: PostId,

    /// Time since `started_at` as `"<h>h <m>m <s>s"`, or `"inactive"`
    /// while no run is active
    pub uptime: String,
}

/// Result of one fetch-detect-forward cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TickOutcome {
    /// Posts that had at least one photo delivered successfully
    pub new_posts: usize,

    /// Photos delivered successfully during the cycle
    pub photos_sent: usize,
}

/// Event emitted by the pipeline
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The pipeline transitioned to running
    Started,

    /// The pipeline transitioned to stopped
    Stopped,

    /// A poll cycle finished
    TickCompleted {
        /// Posts that had at least one photo delivered
        new_posts: usize,
        /// Photos delivered during the cycle
        photos_sent: usize,
    },

    /// A photo was delivered to the channel
    PhotoForwarded {
        /// Post the photo belongs to
        post_id: PostId,
    },

    /// A delivery failed and the post's remaining photos were skipped
    PostAbandoned {
        /// Post whose delivery failed
        post_id: PostId,
        /// Failure description
        error: String,
    },

    /// A wall fetch failed; the cycle contributed nothing
    FeedCheckFailed {
        /// Failure description
        error: String,
    },

    /// The process is shutting down
    Shutdown,
}
