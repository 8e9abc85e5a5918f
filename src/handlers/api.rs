//! Liveness and service-info handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

/// Health check: status plus the live connection count from the registry.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": "ok",
        "connections": state.registry.size(),
        "timestamp": timestamp,
    }))
}

/// Service info: name, version, configured model, feature list.
pub async fn api_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "name": "Rev Voice Assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.gemini_model,
        "features": ["real-time-audio", "interruptions", "multi-language", "chunked-audio"],
    }))
}
