//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`control`] — Pipeline lifecycle commands
//! - [`status`] — Status snapshot
//! - [`config`] — Configuration
//! - [`system`] — Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod config;
mod control;
mod status;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use config::*;
pub use control::*;
pub use status::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/control
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ControlRequest {
    /// One of "start", "stop", "restart", "check"
    pub action: String,
}

/// Response body for POST /api/control
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ControlResponse {
    /// Whether the action was applied
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
}
