//! Configuration module for the voice gateway.
//!
//! Configuration comes from environment variables (with an optional `.env`
//! file loaded by the binary) over built-in defaults. CLI flags in the
//! binary may override individual fields afterwards.
//!
//! # Environment variables
//!
//! - `HOST` / `PORT` - bind address (default `0.0.0.0:3001`)
//! - `GEMINI_API_KEY` - upstream API key; without it every session fails its
//!   handshake and the client is told so
//! - `GEMINI_MODEL` - upstream model (default `models/gemini-2.0-flash-live-001`)
//! - `GEMINI_VOICE` - synthesized voice (default `Aoede`)
//! - `GEMINI_WS_URL` - upstream endpoint override, used by tests
//! - `SYSTEM_INSTRUCTIONS` - persona override for the setup handshake
//! - `CORS_ALLOWED_ORIGINS` - `*`, a comma-separated list, or unset for
//!   same-origin only
//! - `STATIC_DIR` - directory served at the root (default `public`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::live::{
    DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VOICE, DEFAULT_SYSTEM_INSTRUCTIONS, GEMINI_LIVE_WS_URL,
    GeminiConfig,
};

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default static file directory.
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// PORT was set but is not a valid TCP port
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Gemini API key; sessions cannot be established without it
    pub gemini_api_key: Option<String>,
    /// Upstream model identifier
    pub gemini_model: String,
    /// Prebuilt voice for synthesized responses
    pub gemini_voice: String,
    /// Upstream WebSocket endpoint
    pub gemini_ws_url: String,
    /// Persona override; falls back to the built-in system instructions
    pub system_instructions: Option<String>,
    /// CORS origins: `*`, comma-separated list, or None for same-origin only
    pub cors_allowed_origins: Option<String>,
    /// Static file directory served at the root, if any
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_voice: DEFAULT_GEMINI_VOICE.to_string(),
            gemini_ws_url: GEMINI_LIVE_WS_URL.to_string(),
            system_instructions: None,
            cors_allowed_origins: None,
            static_dir: Some(PathBuf::from(DEFAULT_STATIC_DIR)),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        config.gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Ok(voice) = env::var("GEMINI_VOICE") {
            config.gemini_voice = voice;
        }
        if let Ok(url) = env::var("GEMINI_WS_URL") {
            config.gemini_ws_url = url;
        }
        config.system_instructions = env::var("SYSTEM_INSTRUCTIONS").ok();
        config.cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();
        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        Ok(config)
    }

    /// The socket address to bind, as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the per-session upstream configuration.
    pub fn live_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone().unwrap_or_default(),
            model: self.gemini_model.clone(),
            voice: self.gemini_voice.clone(),
            instructions: self
                .system_instructions
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTIONS.to_string()),
            ws_url: self.gemini_ws_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_voice, DEFAULT_GEMINI_VOICE);
    }

    #[test]
    fn test_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_live_config_defaults_persona() {
        let config = ServerConfig {
            gemini_api_key: Some("key".to_string()),
            ..ServerConfig::default()
        };
        let live = config.live_config();
        assert_eq!(live.api_key, "key");
        assert_eq!(live.instructions, DEFAULT_SYSTEM_INSTRUCTIONS);
    }

    #[test]
    fn test_live_config_persona_override() {
        let config = ServerConfig {
            system_instructions: Some("Short persona".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(config.live_config().instructions, "Short persona");
        assert!(config.live_config().api_key.is_empty());
    }
}
