//! Pipeline control handlers.

use super::{ControlRequest, ControlResponse};
use crate::api::AppState;
use crate::error::Error;
use axum::{Json, extract::State};

/// POST /api/control - Apply a lifecycle command to the pipeline
#[utoipa::path(
    post,
    path = "/api/control",
    tag = "control",
    request_body = ControlRequest,
    responses(
        (status = 200, description = "Command applied", body = ControlResponse),
        (status = 400, description = "Unknown action or invalid configuration"),
        (status = 409, description = "Command requires a running pipeline"),
        (status = 502, description = "Upstream feed or delivery failure")
    )
)]
pub async fn control(
    State(state): State<AppState>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, Error> {
    tracing::info!(action = %request.action, "Control command received");

    let message = match request.action.as_str() {
        "start" => {
            state.relay.start().await?;
            "pipeline started".to_string()
        }
        "stop" => {
            state.relay.stop().await?;
            "pipeline stopped".to_string()
        }
        "restart" => {
            state.relay.restart().await?;
            "pipeline restarted".to_string()
        }
        "check" => {
            let outcome = state.relay.check_now().await?;
            format!(
                "checked: {} new posts, {} photos sent",
                outcome.new_posts, outcome.photos_sent
            )
        }
        other => {
            return Err(Error::Config {
                message: format!("unknown action: {other}"),
                key: Some("action".to_string()),
            });
        }
    };

    Ok(Json(ControlResponse {
        success: true,
        message,
    }))
}
