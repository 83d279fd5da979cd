//! Start/stop/restart coordination.

use chrono::Utc;

use crate::error::Result;
use crate::types::{Event, RunState, RunStats};

use super::{WallRelay, poller};

impl WallRelay {
    /// Start the relay pipeline.
    ///
    /// Validates the configuration, resets the run counters, seeds the dedup
    /// ledger from the current feed page so the existing backlog is never
    /// forwarded, and installs the polling loop. The first poll cycle runs
    /// immediately, not after the first full period.
    ///
    /// Calling while the pipeline is already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::error::Error::Config) if a mandatory
    /// configuration value is missing; the pipeline stays stopped. A failed
    /// seed fetch is not an error: the relay starts with an empty ledger and
    /// forwards everything it sees from then on.
    pub async fn start(&self) -> Result<()> {
        let _lifecycle = self.pipeline.lifecycle_lock.lock().await;

        {
            let state = *self.pipeline.run_state.read().await;
            if state == RunState::Running || state == RunState::Starting {
                tracing::info!(state = %state, "Start requested but pipeline is already active");
                return Ok(());
            }
        }

        tracing::info!("Starting relay pipeline");
        *self.pipeline.run_state.write().await = RunState::Starting;

        // 1. Fail fast on incomplete configuration
        if let Err(e) = self.config.validate() {
            tracing::error!(error = %e, "Configuration rejected, aborting start");
            self.rollback_failed_start().await;
            return Err(e);
        }

        // 2. Fresh counters for the new run
        {
            let mut stats = self.pipeline.stats.lock().await;
            *stats = RunStats {
                started_at: Some(Utc::now()),
                ..RunStats::default()
            };
        }

        // 3. Baseline the ledger from the current feed page. A failed seed
        //    fetch degrades to an empty baseline instead of failing the start.
        match self.feed.recent_posts(self.config.feed.page_size).await {
            Ok(posts) => {
                let mut ledger = self.pipeline.ledger.lock().await;
                ledger.clear();
                ledger.seed(&posts);
                tracing::info!(
                    seeded = ledger.len(),
                    highest_id = %ledger.highest(),
                    "Ledger seeded from current feed page"
                );
            }
            Err(e) => {
                let mut ledger = self.pipeline.ledger.lock().await;
                ledger.clear();
                tracing::warn!(error = %e, "Seed fetch failed, starting with an empty ledger");
            }
        }

        // 4. Mark running before the poller spawns so its immediate first
        //    cycle is not suppressed by the state check
        *self.pipeline.run_state.write().await = RunState::Running;

        // 5. Install the polling loop
        let handle = poller::spawn_poller(self.clone());
        *self.pipeline.poller.lock().await = Some(handle);

        self.emit_event(Event::Started);
        tracing::info!("Relay pipeline started");
        Ok(())
    }

    /// Stop the relay pipeline.
    ///
    /// Cancels the polling loop, waits for any in-flight cycle to complete,
    /// clears the dedup ledger, and closes out the run. Calling while already
    /// stopped is a no-op.
    ///
    /// Stopping is unconditionally terminal: the pipeline always ends up
    /// `Stopped` and the result is always `Ok`. The `Result` return exists
    /// for contract symmetry with [`start`](Self::start).
    pub async fn stop(&self) -> Result<()> {
        let _lifecycle = self.pipeline.lifecycle_lock.lock().await;

        {
            let state = *self.pipeline.run_state.read().await;
            if state == RunState::Stopped {
                tracing::debug!("Stop requested but pipeline is already stopped");
                return Ok(());
            }
        }

        tracing::info!("Stopping relay pipeline");
        *self.pipeline.run_state.write().await = RunState::Stopping;

        // 1. Cancel the polling loop; an in-flight cycle completes first.
        //    The handle is taken out before the await so the poller slot is
        //    not locked while waiting.
        let poller = self.pipeline.poller.lock().await.take();
        if let Some(handle) = poller {
            handle.shutdown().await;
            tracing::info!("Poller shut down");
        }

        // 2. Wait out any straggling manual check before touching shared state
        let _tick = self.pipeline.tick_lock.lock().await;

        // 3. Drop the dedup baseline; the next start reseeds from the live feed
        {
            let mut ledger = self.pipeline.ledger.lock().await;
            let forgotten = ledger.len();
            ledger.clear();
            tracing::debug!(forgotten, "Ledger cleared");
        }

        // 4. Close out the run; counters stay readable until the next start
        {
            let mut stats = self.pipeline.stats.lock().await;
            stats.started_at = None;
        }

        *self.pipeline.run_state.write().await = RunState::Stopped;
        self.emit_event(Event::Stopped);
        tracing::info!("Relay pipeline stopped");
        Ok(())
    }

    /// Restart the pipeline: stop, wait out the grace period, start again.
    ///
    /// The grace period lets the delivery platform close the previous session
    /// before a new one opens; tune `relay.restart_grace` if the destination
    /// rejects rapid reconnects.
    ///
    /// # Errors
    ///
    /// Propagates a failed [`start`](Self::start); the stop half cannot fail.
    pub async fn restart(&self) -> Result<()> {
        tracing::info!("Restarting relay pipeline");
        self.stop().await?;
        tokio::time::sleep(self.config.relay.restart_grace).await;
        self.start().await
    }

    /// Roll a failed start back to `Stopped`.
    ///
    /// Configuration validation is the only fallible start-up step, so there
    /// are no partially-initialized adapters to release; the rollback is a
    /// state reset.
    async fn rollback_failed_start(&self) {
        *self.pipeline.run_state.write().await = RunState::Stopped;
    }
}
