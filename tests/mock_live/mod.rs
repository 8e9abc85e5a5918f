//! Mock Gemini Live WebSocket server for integration tests.
//!
//! Speaks just enough of the `BidiGenerateContent` protocol: acknowledges the
//! setup handshake with `setupComplete`, records every inbound frame, and
//! answers each completed audio turn with one audio-bearing `serverContent`
//! frame.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Base64 stand-in for synthesized pcm audio.
pub const MOCK_AUDIO_DATA: &str = "UklGRiQAAABXQVZF";

/// Spawn a mock upstream server.
///
/// Returns the `ws://` URL to dial and a receiver yielding every JSON frame
/// any connection sends to the mock, in arrival order.
pub async fn spawn_mock_live() -> (String, mpsc::UnboundedReceiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle_connection(stream, frame_tx.clone()));
        }
    });

    (format!("ws://{addr}/"), frame_rx)
}

/// Spawn a mock upstream that accepts the WebSocket and immediately closes
/// it without acknowledging setup, simulating a handshake rejection.
pub async fn spawn_rejecting_mock() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                let _ = ws.close(None).await;
            });
        }
    });

    format!("ws://{addr}/")
}

/// Spawn a mock upstream that completes the setup handshake and then closes
/// the session, simulating an upstream that goes away mid-conversation.
pub async fn spawn_closing_after_ready_mock() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        let is_setup = serde_json::from_str::<Value>(&text)
                            .map(|v| v.get("setup").is_some())
                            .unwrap_or(false);
                        if is_setup {
                            let ack = json!({"setupComplete": {}});
                            let _ = ws.send(Message::Text(ack.to_string().into())).await;
                            break;
                        }
                    }
                }
                let _ = ws.close(None).await;
            });
        }
    });

    format!("ws://{addr}/")
}

async fn handle_connection(stream: TcpStream, frame_tx: mpsc::UnboundedSender<Value>) {
    let Ok(ws) = accept_async(stream).await else {
        return;
    };
    let (mut write, mut read) = ws.split();

    while let Some(Ok(msg)) = read.next().await {
        match msg {
            Message::Text(text) => {
                let Ok(value) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                let is_setup = value.get("setup").is_some();
                let reply_with_audio = completed_audio_turn(&value);
                let _ = frame_tx.send(value);

                if is_setup {
                    let ack = json!({"setupComplete": {}});
                    if write
                        .send(Message::Text(ack.to_string().into()))
                        .await
                        .is_err()
                    {
                        return;
                    }
                } else if reply_with_audio {
                    let reply = json!({
                        "serverContent": {
                            "parts": [
                                {"inline_data": {"mime_type": "audio/pcm;rate=24000", "data": MOCK_AUDIO_DATA}},
                                {"text": "ok"}
                            ]
                        }
                    });
                    if write
                        .send(Message::Text(reply.to_string().into()))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }
            Message::Close(_) => return,
            _ => {}
        }
    }
}

/// Whether a frame is a turn-completing `clientContent` carrying audio.
fn completed_audio_turn(value: &Value) -> bool {
    let Some(content) = value.get("clientContent") else {
        return false;
    };
    let complete = content["turn_complete"].as_bool().unwrap_or(false);
    let has_audio = content["turns"]
        .as_array()
        .and_then(|turns| turns.first())
        .and_then(|turn| turn["parts"].as_array())
        .map(|parts| parts.iter().any(|p| p.get("inline_data").is_some()))
        .unwrap_or(false);
    complete && has_audio
}
