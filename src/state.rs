//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::registry::ConnectionRegistry;

/// State shared across all handlers.
///
/// The registry is the only cross-connection mutable state in the process;
/// everything else per connection lives inside that connection's tasks.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Live connection table, read by the health endpoint
    pub registry: ConnectionRegistry,
}

impl AppState {
    /// Create the shared state for the server.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            registry: ConnectionRegistry::new(),
        })
    }
}
