//! Status snapshot reporting.

use chrono::{DateTime, Utc};

use crate::types::{RunState, StatusSnapshot};

use super::WallRelay;

impl WallRelay {
    /// Current status of the pipeline.
    ///
    /// A pure read of in-memory state: never fails, regardless of pipeline
    /// state or adapter health.
    pub async fn status(&self) -> StatusSnapshot {
        let state = *self.pipeline.run_state.read().await;
        let stats = self.pipeline.stats.lock().await.clone();

        StatusSnapshot {
            state,
            running: state == RunState::Running,
            photos_sent: stats.photos_sent,
            started_at: stats.started_at,
            last_poll_at: stats.last_poll_at,
            last_seen_id: stats.last_seen_id,
            uptime: format_uptime(stats.started_at),
        }
    }
}

/// Format the time since `started_at` as `"<h>h <m>m <s>s"`, or `"inactive"`
/// when no run is active. Negative elapsed time (clock adjustment) clamps
/// to zero.
pub(crate) fn format_uptime(started_at: Option<DateTime<Utc>>) -> String {
    let Some(started_at) = started_at else {
        return "inactive".to_string();
    };

    let total_secs = Utc::now()
        .signed_duration_since(started_at)
        .num_seconds()
        .max(0);

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
