//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the wallgram REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the wallgram REST API
///
/// This struct is used to generate the OpenAPI 3.1 specification that describes
/// all available endpoints, request/response types, and API behavior.
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "wallgram REST API",
        version = "0.1.0",
        description = "REST API for controlling the VK wall to Telegram channel photo relay",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Control
        crate::api::routes::control,

        // Status
        crate::api::routes::get_status,

        // Configuration
        crate::api::routes::get_config,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::PostId,
        crate::types::PhotoSize,
        crate::types::PhotoAttachment,
        crate::types::Attachment,
        crate::types::WallPost,
        crate::types::RunState,
        crate::types::RunStats,
        crate::types::StatusSnapshot,
        crate::types::TickOutcome,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::FeedConfig,
        crate::config::DeliveryConfig,
        crate::config::RelayConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::ControlRequest,
        crate::api::routes::ControlResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "control", description = "Pipeline control - Start, stop, restart the relay and trigger manual checks"),
        (name = "status", description = "Status - Run state, counters, and uptime of the relay pipeline"),
        (name = "config", description = "Configuration - Inspect the effective configuration (secrets redacted)"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, event stream"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add API key authentication scheme to OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
