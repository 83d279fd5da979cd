//! Single poll pass: fetch a page, detect new posts, forward their photos.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::types::{Event, RunState, TickOutcome, WallPost};

use super::WallRelay;

impl WallRelay {
    /// Run one poll cycle outside the timer cadence.
    ///
    /// Shares all dedup and pacing semantics with a scheduled tick, including
    /// the tick lock: a manual check issued while a scheduled tick is
    /// in-flight waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] unless the pipeline is `Running`. Feed
    /// errors propagate unchanged; per-photo delivery failures do not fail
    /// the cycle.
    pub async fn check_now(&self) -> Result<TickOutcome> {
        let state = *self.pipeline.run_state.read().await;
        if state != RunState::Running {
            return Err(Error::NotRunning);
        }

        tracing::info!("Manual feed check requested");
        self.run_tick().await
    }

    /// Run one fetch-detect-forward cycle.
    ///
    /// Holds the tick lock for the whole cycle so scheduled ticks and manual
    /// checks never interleave. The ledger and stats locks are only taken for
    /// short synchronous sections, never across a delivery call.
    pub(crate) async fn run_tick(&self) -> Result<TickOutcome> {
        let _tick = self.pipeline.tick_lock.lock().await;

        let mut posts = self.feed.recent_posts(self.config.feed.page_size).await?;

        // Id-descending gives a deterministic processing order regardless of
        // how the feed orders or pins posts.
        posts.sort_by(|a, b| b.id.cmp(&a.id));

        let mut outcome = TickOutcome::default();
        let mut delivery_calls = 0usize;

        for post in &posts {
            let fresh = {
                let mut ledger = self.pipeline.ledger.lock().await;
                let fresh = ledger.is_new(post.id);
                if fresh {
                    // Marked before the first delivery attempt: a failed post
                    // is abandoned, not retried on the next cycle.
                    ledger.mark_seen(post.id);
                }
                fresh
            };

            if !fresh {
                tracing::debug!(post_id = %post.id, "Post already seen, skipping");
                continue;
            }

            let delivered = self.forward_post(post, &mut delivery_calls).await;
            if delivered > 0 {
                outcome.new_posts += 1;
                outcome.photos_sent += delivered;
            }
        }

        let highest = { self.pipeline.ledger.lock().await.highest() };
        {
            let mut stats = self.pipeline.stats.lock().await;
            stats.last_poll_at = Some(Utc::now());
            stats.last_seen_id = highest;
            stats.photos_sent += outcome.photos_sent as u64;
        }

        if outcome.new_posts > 0 {
            tracing::info!(
                new_posts = outcome.new_posts,
                photos_sent = outcome.photos_sent,
                last_seen_id = %highest,
                "Poll cycle forwarded new posts"
            );
        } else {
            tracing::debug!(last_seen_id = %highest, "Poll cycle found nothing new");
        }

        self.emit_event(Event::TickCompleted {
            new_posts: outcome.new_posts,
            photos_sent: outcome.photos_sent,
        });

        Ok(outcome)
    }

    /// Forward every photo of one post, first delivery captioned.
    ///
    /// Returns the number of photos actually delivered. A delivery failure
    /// abandons the remaining photos of this post; the caller moves on to
    /// the next post in the page.
    async fn forward_post(&self, post: &WallPost, delivery_calls: &mut usize) -> usize {
        let mut caption = Some(self.format_caption(post));
        let mut delivered = 0usize;

        for photo in post.photos() {
            let Some(size) = photo.largest() else {
                tracing::warn!(post_id = %post.id, "Photo attachment has no sizes, skipping");
                continue;
            };

            // Pace every delivery call after the first of the cycle, across
            // post boundaries included.
            if *delivery_calls > 0 {
                tokio::time::sleep(self.config.relay.pacing_delay).await;
            }
            *delivery_calls += 1;

            match self.sink.send_photo(&size.url, caption.take().as_deref()).await {
                Ok(()) => {
                    delivered += 1;
                    tracing::debug!(post_id = %post.id, width = size.width, "Photo forwarded");
                    self.emit_event(Event::PhotoForwarded { post_id: post.id });
                }
                Err(e) => {
                    tracing::warn!(
                        post_id = %post.id,
                        error = %e,
                        "Photo delivery failed, abandoning the rest of this post"
                    );
                    self.emit_event(Event::PostAbandoned {
                        post_id: post.id,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        delivered
    }

    /// Caption for the first delivery of a post: publish timestamp plus a
    /// text excerpt, or the configured placeholder when the post is textless.
    fn format_caption(&self, post: &WallPost) -> String {
        let body = if post.text.is_empty() {
            self.config.relay.caption_placeholder.clone()
        } else {
            excerpt(&post.text, self.config.relay.caption_limit)
        };

        format!("{}\n\n{}", post.published_at.format("%Y-%m-%d %H:%M UTC"), body)
    }
}

/// Truncate to at most `limit` characters, appending an ellipsis when the
/// text was cut. Counts characters, not bytes, so multi-byte text is never
/// split mid-character.
pub(crate) fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(limit).collect();
    cut.push('…');
    cut
}
