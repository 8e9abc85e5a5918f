//! Relay WebSocket handler.
//!
//! One handler task per accepted client socket. The handler allocates a
//! connection id, registers it, builds the upstream bridge, and then moves
//! client frames toward the bridge and bridge events back to the client.
//!
//! Ordering guarantees: inbound client messages are processed strictly in
//! arrival order by the single receive loop, and bridge events reach the
//! client in emission order through one mpsc channel and one writer task.
//! The two directions are not ordered against each other.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::live::{CONNECT_FAILED_MESSAGE, GeminiLive, LiveError, LiveEvent};
use crate::state::AppState;

use super::messages::{RelayIncomingMessage, RelayOutgoingMessage};

/// Channel buffer size for outbound client messages.
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Channel buffer size for bridge events.
const EVENT_BUFFER_SIZE: usize = 256;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// MIME type assumed for legacy `audio_input` uploads.
const LEGACY_AUDIO_MIME: &str = "audio/pcm";

/// How long teardown waits for the writer to flush queued events.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Relay WebSocket handler.
///
/// Upgrades the HTTP connection to a WebSocket session bridged to one
/// upstream Gemini Live session.
pub async fn relay_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("relay WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_relay_socket(socket, state))
}

/// Drive one relay connection from accept to teardown.
async fn handle_relay_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "relay WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<RelayOutgoingMessage>(CHANNEL_BUFFER_SIZE);

    // Writer task: the only place that touches the client sink, so outbound
    // order is exactly queue order.
    let mut sender_task = tokio::spawn(async move {
        while let Some(message) = message_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("failed to serialize outgoing message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                debug!("failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let mut bridge = GeminiLive::new(app_state.config.live_config());
    app_state.registry.register(connection_id, bridge.handle());

    // Bridge events funnel through one queue into the writer task, so
    // connection_ready always precedes any audio the session produces. The
    // pump reports whether the session ever became ready: an upstream end
    // after that point tears the client connection down, while a failed
    // handshake leaves it open but inert.
    let (event_tx, mut event_rx) = mpsc::channel::<LiveEvent>(EVENT_BUFFER_SIZE);
    let pump_tx = message_tx.clone();
    let mut pump_task = tokio::spawn(async move {
        let mut session_was_ready = false;
        while let Some(event) = event_rx.recv().await {
            if matches!(event, LiveEvent::Ready) {
                session_was_ready = true;
            }
            let outgoing = match event {
                LiveEvent::Ready => RelayOutgoingMessage::ConnectionReady,
                LiveEvent::Audio(part) => RelayOutgoingMessage::AudioResponse { data: part },
                LiveEvent::Content(content) => {
                    RelayOutgoingMessage::ServerContent { data: content }
                }
                LiveEvent::Error(message) => RelayOutgoingMessage::Error { message },
            };
            if pump_tx.send(outgoing).await.is_err() {
                break;
            }
        }
        session_was_ready
    });

    if let Err(e) = bridge.connect(event_tx).await {
        // The connection stays open but inert; the client opens a new one.
        error!(%connection_id, "failed to start upstream session: {}", e);
        let _ = message_tx
            .send(RelayOutgoingMessage::Error {
                message: CONNECT_FAILED_MESSAGE.to_string(),
            })
            .await;
    }

    let mut pump_done = false;
    loop {
        tokio::select! {
            msg_result = receiver.next() => {
                match msg_result {
                    Some(Ok(msg)) => {
                        let continue_processing =
                            process_relay_message(msg, connection_id, &bridge, &message_tx).await;
                        if !continue_processing {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(%connection_id, "relay WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
            result = &mut pump_task, if !pump_done => {
                pump_done = true;
                if result.unwrap_or(false) {
                    info!(%connection_id, "upstream session ended, closing client connection");
                    break;
                }
            }
        }
    }

    // Teardown: closing the client socket closes the paired upstream
    // session. Repeated teardown is a no-op on every step.
    bridge.close();
    app_state.registry.unregister(&connection_id);
    drop(message_tx);
    if !pump_done {
        let _ = pump_task.await;
    }
    // Let the writer flush any final error event before stopping it.
    if timeout(FLUSH_TIMEOUT, &mut sender_task).await.is_err() {
        sender_task.abort();
    }

    info!(%connection_id, "relay WebSocket connection terminated");
}

/// Process one inbound client frame. Returns false when the loop should end.
async fn process_relay_message(
    msg: Message,
    connection_id: Uuid,
    bridge: &GeminiLive,
    message_tx: &mpsc::Sender<RelayOutgoingMessage>,
) -> bool {
    match msg {
        Message::Text(text) => {
            let incoming: RelayIncomingMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    // Malformed payload is non-fatal: report and keep going.
                    warn!(%connection_id, "failed to parse client message: {}", e);
                    let _ = message_tx
                        .send(RelayOutgoingMessage::Error {
                            message: "Invalid message format".to_string(),
                        })
                        .await;
                    return true;
                }
            };

            match incoming {
                RelayIncomingMessage::StartConversation => {
                    info!(%connection_id, "starting conversation");
                }
                RelayIncomingMessage::AudioChunk {
                    audio,
                    mime_type,
                    is_final,
                } => {
                    forward_chunk(bridge, connection_id, &audio, &mime_type, is_final).await;
                }
                RelayIncomingMessage::AudioInput { audio } => {
                    forward_chunk(bridge, connection_id, &audio, LEGACY_AUDIO_MIME, true).await;
                }
                RelayIncomingMessage::Interrupt => {
                    if let Err(e) = bridge.forward_interrupt().await {
                        warn!(%connection_id, "cannot forward interrupt: {}", e);
                    }
                }
                RelayIncomingMessage::Unknown => {
                    warn!(%connection_id, "unknown message type, ignoring");
                }
            }
            true
        }
        Message::Binary(_) => {
            debug!(%connection_id, "ignoring binary frame");
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            info!(%connection_id, "relay WebSocket close received");
            false
        }
    }
}

/// Forward one audio chunk, dropping it with a log when the session is not
/// ready.
async fn forward_chunk(
    bridge: &GeminiLive,
    connection_id: Uuid,
    audio: &str,
    mime_type: &str,
    is_final: bool,
) {
    match bridge.forward_audio_chunk(audio, mime_type, is_final).await {
        Ok(()) => {}
        Err(LiveError::NotConnected) => {
            debug!(%connection_id, "upstream not ready, dropping audio");
        }
        Err(e) => {
            warn!(%connection_id, "failed to forward audio: {}", e);
        }
    }
}
