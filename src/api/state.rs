//! Application state for the API server

use crate::{Config, WallRelay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clones) and provides
/// access to the relay instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The main WallRelay instance
    pub relay: WallRelay,

    /// Configuration (for read access; control goes through the relay)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: WallRelay, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}
