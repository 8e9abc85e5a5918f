//! Gemini Live session bridge.
//!
//! `GeminiLive` owns the upstream WebSocket for exactly one client
//! connection. It dials the Live endpoint, performs the one-time setup
//! handshake, translates local audio/interrupt events into `clientContent`
//! turn messages, and demultiplexes upstream frames into [`LiveEvent`]s.
//!
//! The socket is split into two ownership-isolated tasks: a writer task
//! draining an mpsc queue into the sink, and a reader task demultiplexing the
//! stream. The bridge itself holds only the queue sender and the shared
//! state, so forward calls never block on socket I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::config::GeminiConfig;
use super::messages::{ServerFrame, SetupMessage, TurnMessage, find_audio_part};
use crate::core::live::base::{
    BridgeHandle, ConnectionState, LiveError, LiveEvent, LiveResult,
};

/// Channel capacity for frames queued toward the upstream socket.
const WS_CHANNEL_CAPACITY: usize = 256;

/// Error message surfaced when the upstream session cannot be established.
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to initialize AI connection";

/// Error message surfaced when an established upstream session breaks.
pub const UPSTREAM_FAILED_MESSAGE: &str = "Connection to AI service failed";

type UpstreamStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Per-connection bridge to one Gemini Live session.
///
/// Created in `Connecting`, driven to `Ready` by the `setupComplete`
/// acknowledgment, and torn down into `Closed` (deliberate or clean close)
/// or `Failed` (handshake or socket failure). Owned exclusively by the
/// connection that created it.
pub struct GeminiLive {
    config: GeminiConfig,
    state: Arc<RwLock<ConnectionState>>,
    ready: Arc<AtomicBool>,
    ws_sender: Option<mpsc::Sender<Message>>,
    reader_handle: Option<JoinHandle<()>>,
}

impl GeminiLive {
    /// Create a bridge for one client connection. No I/O happens until
    /// [`connect`](Self::connect).
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Connecting)),
            ready: Arc::new(AtomicBool::new(false)),
            ws_sender: None,
            reader_handle: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Whether the setup handshake has been acknowledged.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Observer handle for the registry; carries no ownership.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            state: self.state.clone(),
        }
    }

    fn build_ws_url(&self) -> String {
        format!("{}?key={}", self.config.ws_url, self.config.api_key)
    }

    fn fail(&self) {
        self.ready.store(false, Ordering::SeqCst);
        *self.state.write() = ConnectionState::Failed;
    }

    /// Dial the upstream endpoint and start the session handshake.
    ///
    /// On success the setup message is already on the wire and the reader
    /// task will emit [`LiveEvent::Ready`] once upstream acknowledges it.
    /// On failure the bridge is `Failed` and permanently unusable; the
    /// caller reports the error and leaves the client connection inert.
    pub async fn connect(&mut self, events: mpsc::Sender<LiveEvent>) -> LiveResult<()> {
        if self.is_ready() {
            return Ok(());
        }

        if self.config.api_key.is_empty() {
            self.fail();
            return Err(LiveError::InvalidConfiguration(
                "Gemini API key is required".to_string(),
            ));
        }

        let url = self.build_ws_url();
        let (ws_stream, _response) = match tokio_tungstenite::connect_async(url).await {
            Ok(connected) => connected,
            Err(e) => {
                self.fail();
                return Err(LiveError::ConnectionFailed(e.to_string()));
            }
        };

        tracing::info!("connected to Gemini Live API");

        let (mut ws_sink, ws_read) = ws_stream.split();

        // One-time setup handshake, first frame on the wire.
        let setup = SetupMessage::new(&self.config);
        let json = serde_json::to_string(&setup)
            .map_err(|e| LiveError::SerializationError(e.to_string()))?;
        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
            self.fail();
            return Err(LiveError::WebSocketError(e.to_string()));
        }

        let (tx, mut rx) = mpsc::channel::<Message>(WS_CHANNEL_CAPACITY);
        self.ws_sender = Some(tx.clone());

        // Writer task: drains queued frames into the sink. Ends when the
        // bridge drops its sender, flushing a close frame upstream.
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = ws_sink.send(frame).await {
                    tracing::warn!("failed to send upstream frame: {}", e);
                    break;
                }
            }
            let _ = ws_sink.send(Message::Close(None)).await;
        });

        let state = self.state.clone();
        let ready = self.ready.clone();
        self.reader_handle = Some(tokio::spawn(run_reader(ws_read, state, ready, events, tx)));

        Ok(())
    }

    /// Forward one audio chunk as a user turn, immediately and unbuffered.
    ///
    /// The terminal chunk of an utterance sets `turn_complete`, flushing the
    /// turn boundary upstream.
    pub async fn forward_audio_chunk(
        &self,
        audio: &str,
        mime_type: &str,
        turn_complete: bool,
    ) -> LiveResult<()> {
        if !self.is_ready() {
            return Err(LiveError::NotConnected);
        }
        self.send_frame(&TurnMessage::audio_chunk(audio, mime_type, turn_complete))
            .await
    }

    /// Forward a user interruption: one empty-content turn with
    /// `turn_complete` unset, emitted exactly once per request.
    pub async fn forward_interrupt(&self) -> LiveResult<()> {
        if !self.is_ready() {
            return Err(LiveError::NotConnected);
        }
        self.send_frame(&TurnMessage::interruption()).await
    }

    async fn send_frame<T: Serialize>(&self, message: &T) -> LiveResult<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| LiveError::SerializationError(e.to_string()))?;
        match &self.ws_sender {
            Some(sender) => sender
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| LiveError::WebSocketError(e.to_string())),
            None => Err(LiveError::NotConnected),
        }
    }

    /// Shut the session down. Idempotent; called from connection teardown.
    ///
    /// Dropping the queue sender ends the writer task, which flushes a close
    /// frame to the upstream socket.
    pub fn close(&mut self) {
        self.ready.store(false, Ordering::SeqCst);
        {
            let mut state = self.state.write();
            if !state.is_terminal() {
                tracing::info!(previous_state = %*state, "closing upstream session");
                *state = ConnectionState::Closed;
            }
        }
        self.ws_sender = None;
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
    }
}

/// Reader task: demultiplexes upstream frames into bridge events.
async fn run_reader(
    mut stream: UpstreamStream,
    state: Arc<RwLock<ConnectionState>>,
    ready: Arc<AtomicBool>,
    events: mpsc::Sender<LiveEvent>,
    pong_tx: mpsc::Sender<Message>,
) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_frame(&text, &state, &ready, &events).await;
            }
            Ok(Message::Ping(data)) => {
                let _ = pong_tx.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!("upstream WebSocket closed by server");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("upstream WebSocket error: {}", e);
                let was_terminal = {
                    let mut st = state.write();
                    let terminal = st.is_terminal();
                    if !terminal {
                        *st = ConnectionState::Failed;
                    }
                    terminal
                };
                ready.store(false, Ordering::SeqCst);
                if !was_terminal {
                    let _ = events
                        .send(LiveEvent::Error(UPSTREAM_FAILED_MESSAGE.to_string()))
                        .await;
                }
                return;
            }
        }
    }

    // Stream ended without a socket error. Before the handshake completed
    // this is a rejection; after Ready it is a clean close.
    ready.store(false, Ordering::SeqCst);
    let was_connecting = {
        let mut st = state.write();
        match *st {
            ConnectionState::Connecting => {
                *st = ConnectionState::Failed;
                true
            }
            ConnectionState::Ready => {
                *st = ConnectionState::Closed;
                false
            }
            _ => false,
        }
    };
    if was_connecting {
        tracing::warn!("upstream closed before completing setup");
        let _ = events
            .send(LiveEvent::Error(CONNECT_FAILED_MESSAGE.to_string()))
            .await;
    }
}

/// Dispatch one upstream text frame.
async fn handle_frame(
    text: &str,
    state: &Arc<RwLock<ConnectionState>>,
    ready: &Arc<AtomicBool>,
    events: &mpsc::Sender<LiveEvent>,
) {
    let frame: ServerFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("failed to parse upstream frame: {}", e);
            return;
        }
    };

    if frame.setup_complete.is_some() {
        if ready.load(Ordering::SeqCst) {
            tracing::debug!("ignoring duplicate setupComplete");
            return;
        }
        *state.write() = ConnectionState::Ready;
        ready.store(true, Ordering::SeqCst);
        tracing::info!("Gemini Live setup complete");
        let _ = events.send(LiveEvent::Ready).await;
    } else if let Some(content) = frame.server_content {
        if let Some(part) = find_audio_part(&content) {
            let _ = events.send(LiveEvent::Audio(part.clone())).await;
        }
        // Full content always follows the extracted audio part, in order.
        let _ = events.send(LiveEvent::Content(content)).await;
    } else if frame.tool_call_cancellation.is_some() {
        tracing::debug!("upstream cancelled a tool call");
    } else {
        tracing::trace!("unhandled upstream frame");
    }
}
