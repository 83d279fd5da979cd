//! Configuration handler.

use crate::api::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// GET /api/config - Effective configuration with secrets redacted
///
/// Returns the full configuration the process is running with. Credential
/// fields are replaced with a placeholder so the endpoint is safe to expose
/// to dashboards.
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration (secrets redacted)", body = crate::config::Config)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let mut config = (*state.relay.get_config()).clone();

    // Never serve live credentials, even over an authenticated connection.
    if !config.feed.access_token.is_empty() {
        config.feed.access_token = "***REDACTED***".to_string();
    }
    if !config.delivery.bot_token.is_empty() {
        config.delivery.bot_token = "***REDACTED***".to_string();
    }
    if config.server.api.api_key.is_some() {
        config.server.api.api_key = Some("***REDACTED***".to_string());
    }

    (StatusCode::OK, Json(config))
}
