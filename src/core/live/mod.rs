//! Live upstream session module.
//!
//! One bridge per client connection, owning one upstream Gemini Live
//! session. The bridge runs a small state machine
//! (`Connecting → Ready → Closed/Failed`), translates local audio and
//! interrupt events into upstream turn messages, and demultiplexes upstream
//! frames into typed [`LiveEvent`]s delivered over an mpsc channel.

mod base;
pub mod gemini;

pub use base::{BridgeHandle, ConnectionState, LiveError, LiveEvent, LiveResult};
pub use gemini::{
    CONNECT_FAILED_MESSAGE, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VOICE,
    DEFAULT_SYSTEM_INSTRUCTIONS, GEMINI_LIVE_WS_URL, GeminiConfig, GeminiLive,
    UPSTREAM_FAILED_MESSAGE,
};
