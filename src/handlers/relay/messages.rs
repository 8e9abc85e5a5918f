//! Relay WebSocket message types.
//!
//! The client-facing protocol: JSON text frames, tagged by `type`. Inbound
//! tags decode into an exhaustive enum with an explicit `Unknown` variant so
//! unrecognized tags are a typed no-op instead of a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_mime_type() -> String {
    "audio/pcm".to_string()
}

fn default_final() -> bool {
    true
}

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Incoming WebSocket messages from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayIncomingMessage {
    /// Conversation start marker; informational
    StartConversation,

    /// One captured audio chunk; `final` closes the current turn
    AudioChunk {
        /// Base64 audio payload
        audio: String,
        /// MIME type of the payload
        #[serde(rename = "mimeType", default = "default_mime_type")]
        mime_type: String,
        /// Whether this chunk terminates the turn
        #[serde(rename = "final", default = "default_final")]
        is_final: bool,
    },

    /// Legacy single-shot audio upload: one terminal pcm chunk
    AudioInput {
        /// Base64 audio payload
        audio: String,
    },

    /// User interruption of the in-flight response
    Interrupt,

    /// Any unrecognized tag; logged and ignored
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Outgoing WebSocket messages to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayOutgoingMessage {
    /// Upstream session established; always the first event of a session
    ConnectionReady,

    /// An audio-typed inline part from the upstream response
    AudioResponse {
        /// The inline part, `{inline_data: {mime_type, data}}`
        data: Value,
    },

    /// Full upstream content payload, forwarded opaquely
    ServerContent {
        /// Opaque upstream content
        data: Value,
    },

    /// Error message
    Error {
        /// Human-readable description
        message: String,
    },
}
