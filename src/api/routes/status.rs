//! Status handler.

use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /api/status - Pipeline status snapshot
///
/// A pure read: always succeeds, whatever state the pipeline is in.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Current pipeline status", body = crate::types::StatusSnapshot)
    )
)]
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.relay.status().await)
}
