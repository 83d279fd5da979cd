//! Authentication middleware for the REST API
//!
//! Optional API key authentication via the X-Api-Key header. When
//! `ApiConfig::api_key` is set, every request must carry a matching
//! X-Api-Key header or it receives a 401 Unauthorized response.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Middleware checking for a valid API key in the X-Api-Key header
///
/// # Arguments
///
/// * `State(expected_api_key)` - The key requests must present, or `None`
///   when authentication is disabled
/// * `request` - The incoming HTTP request
/// * `next` - The next middleware/handler in the chain
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use wallgram::api::auth::require_api_key;
///
/// let api_key = Some("secret-key-123".to_string());
/// let router: Router = Router::new()
///     .layer(middleware::from_fn_with_state(
///         api_key,
///         require_api_key
///     ));
/// ```
pub async fn require_api_key(
    State(expected_api_key): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    // No key configured means authentication is disabled
    let Some(expected_key) = expected_api_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());

    // Constant-time comparison so the match position leaks nothing
    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected_key.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing X-Api-Key header"),
    }
}

/// Constant-time byte comparison; always examines every byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

fn unauthorized_response(message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "code": "unauthorized",
            "message": message
        }
    }));

    (StatusCode::UNAUTHORIZED, body).into_response()
}
