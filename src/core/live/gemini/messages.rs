//! Gemini Live API WebSocket message types.
//!
//! All messages are JSON-encoded over the WebSocket. Key spelling follows the
//! wire protocol exactly: the setup payload is snake_case throughout, while
//! turn messages use the mixed `clientContent` / `turn_complete` convention.
//!
//! # Protocol Overview
//!
//! Client messages (sent upstream):
//! - `setup` - One-time session configuration, first frame after connect
//! - `clientContent` - One user turn: inline audio parts plus a completion flag
//!
//! Server frames (received from upstream):
//! - `setupComplete` - Acknowledges the setup handshake
//! - `serverContent` - Generated content; may carry inline audio parts
//! - `toolCallCancellation` - Tool invocation withdrawn; informational only

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{AUDIO_RESPONSE_MODALITY, GeminiConfig};

/// MIME prefix identifying audio-bearing inline parts.
pub const AUDIO_MIME_PREFIX: &str = "audio/";

/// Role attached to every relayed turn.
const USER_ROLE: &str = "user";

// =============================================================================
// Setup Handshake
// =============================================================================

/// Top-level setup message, sent once immediately after connecting.
#[derive(Debug, Clone, Serialize)]
pub struct SetupMessage {
    pub setup: Setup,
}

/// Session configuration carried by the setup message.
#[derive(Debug, Clone, Serialize)]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub system_instruction: SystemInstruction,
}

/// Generation configuration: response modality and voice selection.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub speech_config: SpeechConfig,
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

/// Voice configuration wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

/// Prebuilt voice selection.
#[derive(Debug, Clone, Serialize)]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// System instruction payload: a list of text parts.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<TextPart>,
}

/// A plain text part.
#[derive(Debug, Clone, Serialize)]
pub struct TextPart {
    pub text: String,
}

impl SetupMessage {
    /// Build the one-time setup handshake from session configuration.
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            setup: Setup {
                model: config.model.clone(),
                generation_config: GenerationConfig {
                    response_modalities: vec![AUDIO_RESPONSE_MODALITY.to_string()],
                    speech_config: SpeechConfig {
                        voice_config: VoiceConfig {
                            prebuilt_voice_config: PrebuiltVoiceConfig {
                                voice_name: config.voice.clone(),
                            },
                        },
                    },
                },
                system_instruction: SystemInstruction {
                    parts: vec![TextPart {
                        text: config.instructions.clone(),
                    }],
                },
            },
        }
    }
}

// =============================================================================
// Turn Messages
// =============================================================================

/// Top-level turn message wrapping user content.
#[derive(Debug, Clone, Serialize)]
pub struct TurnMessage {
    #[serde(rename = "clientContent")]
    pub client_content: ClientContent,
}

/// One or more user turns plus the turn-completion flag.
#[derive(Debug, Clone, Serialize)]
pub struct ClientContent {
    pub turns: Vec<Turn>,
    pub turn_complete: bool,
}

/// A single turn: role plus content parts.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: String,
    pub parts: Vec<TurnPart>,
}

/// Content part of a turn: either inline binary data or plain text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TurnPart {
    Inline { inline_data: InlineData },
    Text { text: String },
}

/// Base64 payload tagged with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl TurnMessage {
    /// Wrap one audio chunk as a user turn.
    ///
    /// The terminal chunk of an utterance sets `turn_complete`, flushing the
    /// turn boundary upstream.
    pub fn audio_chunk(audio: &str, mime_type: &str, turn_complete: bool) -> Self {
        Self {
            client_content: ClientContent {
                turns: vec![Turn {
                    role: USER_ROLE.to_string(),
                    parts: vec![TurnPart::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: audio.to_string(),
                        },
                    }],
                }],
                turn_complete,
            },
        }
    }

    /// Build the interruption idiom: one empty text part with
    /// `turn_complete` unset.
    ///
    /// This is how the Live API signals a user barge-in mid-response; it is
    /// not a generic cancellation primitive.
    pub fn interruption() -> Self {
        Self {
            client_content: ClientContent {
                turns: vec![Turn {
                    role: USER_ROLE.to_string(),
                    parts: vec![TurnPart::Text {
                        text: String::new(),
                    }],
                }],
                turn_complete: false,
            },
        }
    }
}

// =============================================================================
// Server Frames
// =============================================================================

/// One frame received from the upstream socket.
///
/// Exactly one of the fields is populated per frame; content is kept as raw
/// JSON so unrecognized part shapes pass through to the client untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ServerFrame {
    #[serde(rename = "setupComplete")]
    pub setup_complete: Option<Value>,
    #[serde(rename = "serverContent")]
    pub server_content: Option<Value>,
    #[serde(rename = "toolCallCancellation")]
    pub tool_call_cancellation: Option<Value>,
}

/// Find the first audio-typed inline part of a content payload.
pub fn find_audio_part(content: &Value) -> Option<&Value> {
    content.get("parts")?.as_array()?.iter().find(|part| {
        part.get("inline_data")
            .and_then(|data| data.get("mime_type"))
            .and_then(|mime| mime.as_str())
            .map(|mime| mime.starts_with(AUDIO_MIME_PREFIX))
            .unwrap_or(false)
    })
}
