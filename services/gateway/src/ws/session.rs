//! Manages the WebSocket connection lifecycle for tablet clients.

use crate::{
    registry::{ClientSink, ConnectionHandle},
    state::AppState,
    ws::protocol::InboundEvent,
};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{
        ConnectInfo, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// WebSocket close code 1013, "try again later". Sent when admission policy
/// refuses a connection.
const CLOSE_TRY_AGAIN_LATER: u16 = 1013;
const CLOSE_REASON_BUSY: &str = "Server sibuk";

/// The write half of a live client socket.
///
/// Sends are serialized through the mutex, so concurrent broadcasts cannot
/// interleave frames on one connection.
struct WsSink {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WsSink {
    async fn send_close(&self, code: u16, reason: &'static str) {
        let mut sink = self.sink.lock().await;
        let _ = sink
            .send(Message::Close(Some(CloseFrame {
                code,
                reason: reason.into(),
            })))
            .await;
    }
}

#[async_trait]
impl ClientSink for WsSink {
    async fn send_text(&self, payload: &str) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(payload.to_owned().into())).await?;
        Ok(())
    }
}

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Registers the connection (or rejects it under the admission policy), then
/// reads frames until the client disconnects. Recognized speech events are
/// dispatched as detached tasks so a slow AI turn never stalls the read loop.
/// Every exit path unregisters the connection.
async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: Arc<AppState>) {
    let (socket_tx, mut socket_rx) = socket.split();
    let id = Uuid::new_v4();
    let sink = Arc::new(WsSink {
        sink: Mutex::new(socket_tx),
    });

    let admitted = state
        .registry
        .register(ConnectionHandle {
            id,
            addr,
            sink: sink.clone(),
        })
        .await;
    if !admitted {
        info!(%addr, "Refusing connection, a client is already connected");
        sink.send_close(CLOSE_TRY_AGAIN_LATER, CLOSE_REASON_BUSY).await;
        return;
    }
    info!(%addr, connection = %id, "Tablet connected");

    while let Some(frame) = socket_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_text_frame(&state, text.as_str()),
            Ok(Message::Close(_)) => {
                info!(connection = %id, "Client sent close frame");
                break;
            }
            Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                warn!(connection = %id, error = %e, "Error reading from client");
                break;
            }
        }
    }

    state.registry.unregister(id).await;
    info!(connection = %id, "Tablet disconnected");
}

/// Decodes one text frame and dispatches recognized events.
///
/// Malformed JSON and unknown events are logged and dropped; the connection
/// is never closed over them. Speech processing is spawned onto the runtime
/// so the caller can go straight back to reading the next frame.
fn handle_text_frame(state: &Arc<AppState>, text: &str) {
    let event = match serde_json::from_str::<InboundEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, raw = %text, "Ignoring malformed client message");
            return;
        }
    };

    match event {
        InboundEvent::SpeechResult { transcript } => {
            if transcript.trim().is_empty() {
                debug!("Ignoring empty transcript");
                return;
            }
            let processor = Arc::clone(&state.processor);
            tokio::spawn(async move {
                processor.process(transcript).await;
            });
        }
        InboundEvent::Unsupported => {
            debug!(raw = %text, "Ignoring unrecognized event");
        }
    }
}
