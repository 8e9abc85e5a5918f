//! Relay WebSocket route configuration.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the relay WebSocket router.
///
/// # Endpoint
///
/// `GET /ws` - WebSocket upgrade for the real-time voice session.
///
/// # Protocol
///
/// After the upgrade, the server dials the upstream Gemini Live session and
/// replies `{"type": "connection_ready"}` once the upstream handshake is
/// acknowledged. The client then streams:
///
/// ```json
/// {"type": "audio_chunk", "audio": "<base64>", "mimeType": "audio/pcm", "final": true}
/// {"type": "interrupt"}
/// ```
///
/// and receives `audio_response`, `server_content`, and `error` events.
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(relay_handler))
        .layer(TraceLayer::new_for_http())
}
