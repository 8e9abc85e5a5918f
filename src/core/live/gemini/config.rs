//! Gemini Live API configuration.
//!
//! Endpoint, model, and voice defaults for the upstream
//! `BidiGenerateContent` WebSocket session, plus the fixed persona payload
//! sent with the setup handshake.

/// Gemini Live API WebSocket endpoint.
pub const GEMINI_LIVE_WS_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerationService/BidiGenerateContent";

/// Default Gemini Live model.
pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-2.0-flash-live-001";

/// Default prebuilt voice for synthesized audio responses.
pub const DEFAULT_GEMINI_VOICE: &str = "Aoede";

/// Response modality requested in the setup handshake.
pub const AUDIO_RESPONSE_MODALITY: &str = "AUDIO";

/// System instructions for the Rev voice assistant persona.
pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = "\
You are Rev, the voice assistant for Revolt Motors, India's leading electric motorcycle company.

Key information about Revolt Motors:
- Founded in 2019 by Rahul Sharma
- Pioneered AI-enabled electric motorcycles in India
- Main products: RV400 and RV300 electric motorcycles
- Features: Smart connectivity, mobile app integration, swappable batteries
- Presence in major Indian cities
- Focus on sustainable mobility and innovation

Guidelines:
- Always be enthusiastic about electric mobility and Revolt Motors
- Provide helpful information about Revolt's products, services, and electric motorcycles
- If asked about competitors, politely redirect to Revolt's advantages
- Be conversational, friendly, and knowledgeable
- If you don't know specific current details, acknowledge it and suggest contacting Revolt directly
- Support multiple languages if the user speaks in Hindi or other Indian languages
- Keep responses concise and engaging for voice interaction";

/// Configuration for one upstream Gemini Live session.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key appended to the WebSocket URL
    pub api_key: String,
    /// Model identifier (e.g., "models/gemini-2.0-flash-live-001")
    pub model: String,
    /// Prebuilt voice name for audio output
    pub voice: String,
    /// System instructions sent with the setup handshake
    pub instructions: String,
    /// WebSocket endpoint, overridable for testing
    pub ws_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            voice: DEFAULT_GEMINI_VOICE.to_string(),
            instructions: DEFAULT_SYSTEM_INSTRUCTIONS.to_string(),
            ws_url: GEMINI_LIVE_WS_URL.to_string(),
        }
    }
}
