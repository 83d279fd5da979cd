//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for controlling the relay
//! pipeline, inspecting its status and configuration, and watching events.

use crate::{Config, Result, WallRelay};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Control
/// - `POST /api/control` - Start, stop, restart, or check the pipeline
///
/// ## Status
/// - `GET /api/status` - Run state, counters, and uptime
///
/// ## Configuration
/// - `GET /api/config` - Get current config (sensitive fields redacted)
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /api/events` - Server-sent events stream
pub fn create_router(relay: WallRelay, config: Arc<Config>) -> Router {
    let state = AppState::new(relay, config.clone());

    // Build the router with all routes
    let router = Router::new()
        // Control
        .route("/api/control", post(routes::control))
        // Status
        .route("/api/status", get(routes::get_status))
        // Configuration
        .route("/api/config", get(routes::get_config))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec))
        .route("/api/events", get(routes::event_stream));

    // Merge Swagger UI routes if enabled in config (before applying state)
    // Note: SwaggerUi will use the existing /api/openapi.json endpoint we already defined
    let router = if config.server.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui")
                .config(utoipa_swagger_ui::Config::from("/api/openapi.json")),
        )
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply authentication middleware if API key is configured
    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
///
/// # Returns
///
/// A configured CorsLayer that allows the specified origins, all methods,
/// and all headers for cross-origin requests.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    // Check if "*" (all origins) is in the list
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        // Allow all origins (default for local development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow specific origins
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// This function creates a TCP listener, binds it to the configured address,
/// and starts serving the API router. It runs until the server is shut down.
///
/// # Arguments
///
/// * `relay` - WallRelay handle the API routes act on
/// * `config` - Arc-wrapped Config containing API configuration
///
/// # Returns
///
/// Returns a Result<()> that completes when the server stops, either due to
/// an error or graceful shutdown.
///
/// # Example
///
/// ```no_run
/// use wallgram::{Config, WallRelay};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let relay = WallRelay::new((*config).clone())?;
///
/// // Start API server (blocks until shutdown)
/// wallgram::api::start_api_server(relay, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(relay: WallRelay, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    // Create the router with all routes
    let app = create_router(relay, config);

    // Bind TCP listener to the configured address
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
