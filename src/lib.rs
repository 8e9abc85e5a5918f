pub mod config;
pub mod core;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use self::core::*;
pub use registry::ConnectionRegistry;
pub use state::AppState;
