//! Base types for the live upstream session bridge.
//!
//! A bridge owns exactly one upstream Gemini Live WebSocket session on behalf
//! of one client connection. These types define its error surface, its
//! connection state machine, and the typed events it emits toward the client
//! channel.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while driving an upstream live session.
#[derive(Debug, Error)]
pub enum LiveError {
    /// Connection to the upstream service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Not connected
    #[error("Not connected")]
    NotConnected,
}

/// Result type for live session operations.
pub type LiveResult<T> = Result<T, LiveError>;

// =============================================================================
// Connection State
// =============================================================================

/// Connection state for an upstream live session.
///
/// A session starts in `Connecting` and transitions to `Ready` once the
/// upstream setup handshake is acknowledged. `Closed` and `Failed` are
/// terminal; forward calls in either are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Dialing the upstream socket and waiting for the setup acknowledgment
    #[default]
    Connecting,
    /// Setup acknowledged, audio can flow
    Ready,
    /// Shut down deliberately or by a clean upstream close
    Closed,
    /// Unrecoverable upstream failure; the client must open a new connection
    Failed,
}

impl ConnectionState {
    /// Whether this state permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Ready => write!(f, "Ready"),
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Bridge Events
// =============================================================================

/// Events emitted by a bridge toward its client channel.
///
/// Events arrive on a single mpsc channel, so their order matches the order
/// in which the upstream produced them.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// Upstream setup handshake acknowledged; the session can take audio
    Ready,
    /// An audio-typed inline part extracted from an upstream content frame
    Audio(serde_json::Value),
    /// The full upstream content payload, forwarded opaquely
    Content(serde_json::Value),
    /// A user-facing error message; the bridge is no longer usable
    Error(String),
}

/// Cheap cloneable view of a bridge's live state.
///
/// Registered in the connection registry so external surfaces (health
/// reporting, tests) can observe a session without taking ownership of it.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    pub(crate) state: Arc<RwLock<ConnectionState>>,
}

impl BridgeHandle {
    /// Current connection state of the bridge this handle observes.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Ready.to_string(), "Ready");
        assert_eq!(ConnectionState::Closed.to_string(), "Closed");
        assert_eq!(ConnectionState::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_connection_state_default_is_connecting() {
        assert_eq!(ConnectionState::default(), ConnectionState::Connecting);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ConnectionState::Connecting.is_terminal());
        assert!(!ConnectionState::Ready.is_terminal());
        assert!(ConnectionState::Closed.is_terminal());
        assert!(ConnectionState::Failed.is_terminal());
    }

    #[test]
    fn test_error_display() {
        let err = LiveError::ConnectionFailed("refused".to_string());
        assert!(err.to_string().contains("Connection failed"));

        let err = LiveError::NotConnected;
        assert_eq!(err.to_string(), "Not connected");
    }

    #[test]
    fn test_bridge_handle_reads_shared_state() {
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));
        let handle = BridgeHandle {
            state: state.clone(),
        };
        assert_eq!(handle.state(), ConnectionState::Connecting);

        *state.write() = ConnectionState::Ready;
        assert_eq!(handle.state(), ConnectionState::Ready);
    }
}
