//! Gemini Live API integration.
//!
//! Wire types and the per-connection session bridge for Google's
//! `BidiGenerateContent` WebSocket API.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{CONNECT_FAILED_MESSAGE, GeminiLive, UPSTREAM_FAILED_MESSAGE};
pub use config::{
    DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VOICE, DEFAULT_SYSTEM_INSTRUCTIONS, GEMINI_LIVE_WS_URL,
    GeminiConfig,
};
pub use messages::{AUDIO_MIME_PREFIX, InlineData, ServerFrame, SetupMessage, TurnMessage};
