//! Relay WebSocket handlers.
//!
//! Per-connection bridging between the browser-facing audio channel and one
//! upstream Gemini Live session.
//!
//! # Protocol
//!
//! ## Client → Server
//!
//! - **start_conversation**: conversation start marker
//! - **audio_chunk**: base64 audio with `mimeType` and a `final` turn flag
//! - **audio_input**: legacy single-shot audio upload
//! - **interrupt**: barge-in while a response is playing
//!
//! ## Server → Client
//!
//! - **connection_ready**: upstream session established
//! - **audio_response**: audio-typed inline part from the model
//! - **server_content**: full upstream content, forwarded opaquely
//! - **error**: error message; the connection itself stays open

mod handler;
pub mod messages;

pub use handler::relay_handler;
