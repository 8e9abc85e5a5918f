//! HTTP API route configuration.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::api::{api_info, health_check};
use crate::state::AppState;
use std::sync::Arc;

/// Create the HTTP API router.
///
/// # Endpoints
///
/// - `GET /health` - liveness plus the live connection count
/// - `GET /api/info` - service name, version, model, and feature list
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/info", get(api_info))
        .layer(TraceLayer::new_for_http())
}
