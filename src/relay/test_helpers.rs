//! Shared test helpers for creating WallRelay instances over mock adapters.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use crate::config::Config;
use crate::delivery::PhotoSink;
use crate::error::{Error, Result};
use crate::feed::WallFeed;
use crate::relay::WallRelay;
use crate::types::{Attachment, Event, PhotoAttachment, PhotoSize, PostId, WallPost};

/// Publish timestamp used by the post builders (2023-11-14 22:13:20 UTC)
pub(crate) const TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Caption prefix produced for posts built with [`TEST_TIMESTAMP`]
pub(crate) const TEST_TIMESTAMP_PREFIX: &str = "2023-11-14 22:13 UTC";

/// Scripted wall feed.
///
/// Serves queued responses front-first; once the queue is empty, every call
/// returns the steady-state page.
pub(crate) struct MockFeed {
    queued: tokio::sync::Mutex<VecDeque<Result<Vec<WallPost>>>>,
    steady: tokio::sync::Mutex<Vec<WallPost>>,
    calls: AtomicUsize,
}

impl MockFeed {
    pub(crate) fn new(steady: Vec<WallPost>) -> Self {
        Self {
            queued: tokio::sync::Mutex::new(VecDeque::new()),
            steady: tokio::sync::Mutex::new(steady),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a one-shot response served before the steady-state page.
    pub(crate) async fn queue_response(&self, response: Result<Vec<WallPost>>) {
        self.queued.lock().await.push_back(response);
    }

    /// Replace the steady-state page.
    pub(crate) async fn set_steady(&self, posts: Vec<WallPost>) {
        *self.steady.lock().await = posts;
    }

    /// Number of fetches served so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WallFeed for MockFeed {
    async fn recent_posts(&self, _count: usize) -> Result<Vec<WallPost>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.queued.lock().await.pop_front() {
            return scripted;
        }
        Ok(self.steady.lock().await.clone())
    }
}

/// One delivery recorded by [`MockSink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SentPhoto {
    pub(crate) url: String,
    pub(crate) caption: Option<String>,
}

/// Recording photo sink.
///
/// Every successful call is recorded in order. Individual calls can be
/// scripted to fail by zero-based call index, and an artificial per-call
/// delay can simulate a slow destination.
pub(crate) struct MockSink {
    recorded: tokio::sync::Mutex<Vec<SentPhoto>>,
    fail_on: tokio::sync::Mutex<HashSet<usize>>,
    delay: tokio::sync::Mutex<Duration>,
    calls: AtomicUsize,
}

impl MockSink {
    pub(crate) fn new() -> Self {
        Self {
            recorded: tokio::sync::Mutex::new(Vec::new()),
            fail_on: tokio::sync::Mutex::new(HashSet::new()),
            delay: tokio::sync::Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script the call with this zero-based index to fail.
    pub(crate) async fn fail_call(&self, index: usize) {
        self.fail_on.lock().await.insert(index);
    }

    /// Delay every delivery by `delay` before it is recorded.
    pub(crate) async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = delay;
    }

    /// Deliveries recorded so far, in call order.
    pub(crate) async fn sent(&self) -> Vec<SentPhoto> {
        self.recorded.lock().await.clone()
    }

    /// Number of delivery calls attempted so far (failures included).
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSink for MockSink {
    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().await;
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on.lock().await.contains(&index) {
            return Err(Error::Delivery(format!("scripted failure on call {index}")));
        }

        self.recorded.lock().await.push(SentPhoto {
            url: photo_url.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }
}

/// Configuration with valid credentials and zeroed delays, so tests run fast.
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.feed.access_token = "vk-test-token".to_string();
    config.feed.group_id = 123;
    config.delivery.bot_token = "123456:test-bot-token".to_string();
    config.delivery.channel_id = "@test_channel".to_string();
    config.relay.pacing_delay = Duration::ZERO;
    config.relay.restart_grace = Duration::ZERO;
    config
}

/// Relay over mock adapters, plus handles to script and inspect them.
pub(crate) fn create_test_relay(
    steady_page: Vec<WallPost>,
) -> (WallRelay, Arc<MockFeed>, Arc<MockSink>) {
    create_test_relay_with_config(test_config(), steady_page)
}

/// Same as [`create_test_relay`] but over a caller-supplied configuration.
pub(crate) fn create_test_relay_with_config(
    config: Config,
    steady_page: Vec<WallPost>,
) -> (WallRelay, Arc<MockFeed>, Arc<MockSink>) {
    let feed = Arc::new(MockFeed::new(steady_page));
    let sink = Arc::new(MockSink::new());
    let relay = WallRelay::with_clients(config, feed.clone(), sink.clone());
    (relay, feed, sink)
}

/// Post with one single-size photo per URL.
pub(crate) fn photo_post(id: i64, urls: &[&str]) -> WallPost {
    WallPost {
        id: PostId::new(id),
        published_at: DateTime::from_timestamp(TEST_TIMESTAMP, 0).unwrap(),
        text: format!("post {id}"),
        attachments: urls
            .iter()
            .map(|url| {
                Attachment::Photo(PhotoAttachment {
                    sizes: vec![PhotoSize {
                        width: 604,
                        height: 403,
                        url: (*url).to_string(),
                    }],
                })
            })
            .collect(),
    }
}

/// Post with custom text and one single-size photo.
pub(crate) fn captioned_post(id: i64, text: &str, url: &str) -> WallPost {
    WallPost {
        text: text.to_string(),
        ..photo_post(id, &[url])
    }
}

/// Post with one photo carrying the given (width, url) size variants.
pub(crate) fn sized_post(id: i64, sizes: &[(u32, &str)]) -> WallPost {
    WallPost {
        id: PostId::new(id),
        published_at: DateTime::from_timestamp(TEST_TIMESTAMP, 0).unwrap(),
        text: format!("post {id}"),
        attachments: vec![Attachment::Photo(PhotoAttachment {
            sizes: sizes
                .iter()
                .map(|(width, url)| PhotoSize {
                    width: *width,
                    height: *width * 2 / 3,
                    url: (*url).to_string(),
                })
                .collect(),
        })],
    }
}

/// Post with no attachments at all.
pub(crate) fn text_post(id: i64, text: &str) -> WallPost {
    WallPost {
        id: PostId::new(id),
        published_at: DateTime::from_timestamp(TEST_TIMESTAMP, 0).unwrap(),
        text: text.to_string(),
        attachments: vec![],
    }
}

/// Wait up to two seconds for an event matching `want`, skipping others.
pub(crate) async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    want: fn(&Event) -> bool,
) -> Event {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if want(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
