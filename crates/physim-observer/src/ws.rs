//! `WebSocket` handler for the real-time sample stream.
//!
//! Clients connect to `GET /ws/stream` and receive a JSON-encoded
//! [`StreamEvent`] text frame for every broadcast: each generated sample
//! plus session lifecycle events. Each connection registers its own
//! outbound queue with the subscriber registry, so a slow client only
//! ever delays itself, never the tick loop or its peers.
//!
//! Clients may also send `{"command":"start"}` or `{"command":"stop"}`
//! to request an individual lifecycle acknowledgement; the reply goes to
//! that subscriber alone. The commands do not control the simulation --
//! that is the REST API's job.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use physim_types::{StreamEvent, SubscriberId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::AppState;

/// A command sent by a connected client over the socket.
#[derive(Debug, serde::Deserialize)]
struct ClientCommand {
    /// The requested acknowledgement: `start` or `stop`.
    command: String,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming events.
///
/// # Route
///
/// `GET /ws/stream`
pub async fn ws_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: register with the subscriber
/// registry, forward queued events as text frames, and unregister on
/// disconnect.
async fn handle_ws(mut socket: WebSocket, state: AppState) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = state.registry.register(tx);
    debug!(subscriber = %id, "WebSocket client connected");

    loop {
        tokio::select! {
            // Deliver the next queued event to the client.
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(subscriber = %id, "failed to serialize stream event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!(subscriber = %id, "WebSocket client disconnected (send failed)");
                            break;
                        }
                    }
                    // The sender half is gone; nothing more will arrive.
                    None => break,
                }
            }
            // Watch for client frames: close, ping, or a command.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        handle_client_command(&state, id, text.as_str());
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore binary and pong frames.
                    }
                }
            }
        }
    }

    let _ = state.registry.unregister(id);
}

/// Answer a client command with an individual acknowledgement.
///
/// A `start` acknowledgement carries the current session identifier when
/// one is active; malformed or unknown commands are logged and ignored.
fn handle_client_command(state: &AppState, id: SubscriberId, text: &str) {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(cmd) => match cmd.command.as_str() {
            "start" => {
                let _ = state.registry.send_to(
                    id,
                    StreamEvent::SessionStarted {
                        session_id: state.clock.current_session_id(),
                    },
                );
            }
            "stop" => {
                let _ = state.registry.send_to(id, StreamEvent::SessionStopped);
            }
            other => {
                debug!(subscriber = %id, command = other, "ignoring unknown client command");
            }
        },
        Err(_) => {
            debug!(subscriber = %id, "ignoring malformed client message");
        }
    }
}
