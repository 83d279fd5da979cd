//! Fixed-interval polling loop.
//!
//! The poller is a spawned task driving [`WallRelay::run_tick`] on the
//! configured period, with an immediate first cycle at spawn. Cancellation is
//! observed only between cycles, so stopping never aborts an in-flight cycle.

use crate::types::{Event, RunState};

use super::WallRelay;

/// Handle of a spawned polling loop
pub(crate) struct PollerHandle {
    task: tokio::task::JoinHandle<()>,
    cancel: tokio_util::sync::CancellationToken,
}

impl PollerHandle {
    /// Signal the loop to stop and wait for any in-flight cycle to finish.
    pub(crate) async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Poller task terminated abnormally");
        }
    }
}

/// Spawn the polling loop for `relay`.
///
/// The first cycle runs immediately, not after the first full period. Cycles
/// whose errors reach the loop are logged and surfaced as
/// [`Event::FeedCheckFailed`]; they never terminate the loop.
pub(crate) fn spawn_poller(relay: WallRelay) -> PollerHandle {
    let cancel = tokio_util::sync::CancellationToken::new();
    let loop_cancel = cancel.clone();
    let period = relay.config.relay.poll_interval;

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(period = ?period, "Poller started");

        loop {
            tokio::select! {
                _ = loop_cancel.cancelled() => {
                    break;
                }
                _ = interval.tick() => {}
            }

            // The interval can fire while a stop is mid-transition; a cycle
            // only runs against a running pipeline.
            let state = *relay.pipeline.run_state.read().await;
            if state != RunState::Running {
                tracing::debug!(state = %state, "Pipeline not running, skipping scheduled check");
                continue;
            }

            if let Err(e) = relay.run_tick().await {
                tracing::error!(error = %e, "Scheduled feed check failed");
                relay.emit_event(Event::FeedCheckFailed {
                    error: e.to_string(),
                });
            }
        }

        tracing::info!("Poller stopped");
    });

    PollerHandle { task, cancel }
}
