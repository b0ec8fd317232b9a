//! WebSocket handler: marker fan-out.
//!
//! DESIGN
//! ======
//! On upgrade, registers the connection and enters a `select!` loop:
//! - Incoming client messages → decode + validate → fan out to peers
//! - Messages forwarded from peers → write to this client
//!
//! Inbound handling is a pure decision (`Outcome`); the loop owns the
//! registry and socket side effects. A valid marker is forwarded as the
//! original websocket message, so text stays text and binary stays binary.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register (no handshake payload)
//! 2. Client sends `paint` frames → validated → broadcast to all but sender
//! 3. Close or transport error → unregister (peers are not told)

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::ErrorCode;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::services;
use crate::state::{AppState, ConnectionId};

// =============================================================================
// OUTCOME
// =============================================================================

/// What to do with one inbound message.
#[derive(Debug)]
enum Outcome {
    /// Valid marker: forward this message, unmodified, to every peer.
    Forward(Message),
    /// Not marker traffic (control frames, unknown events). Dropped quietly.
    Ignored,
    /// Undecodable or invalid marker. Dropped with a warning.
    Rejected,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    // Per-connection queue for markers forwarded from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Message>(state.client_queue_capacity);
    let connection_id = services::relay::register(&state, client_tx).await;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                if matches!(msg, Message::Close(_)) {
                    break;
                }
                relay_inbound(&state, connection_id, msg).await;
            }
            Some(msg) = client_rx.recv() => {
                if socket.send(msg).await.is_err() {
                    break;
                }
            }
        }
    }

    services::relay::unregister(&state, connection_id).await;
}

/// Classify one inbound message and fan it out if it is a valid marker.
/// Returns the number of peers it was handed to.
async fn relay_inbound(state: &AppState, connection_id: ConnectionId, msg: Message) -> usize {
    match classify_inbound(connection_id, msg) {
        Outcome::Forward(msg) => services::relay::broadcast(state, &msg, Some(connection_id)).await,
        Outcome::Ignored | Outcome::Rejected => 0,
    }
}

// =============================================================================
// INGRESS VALIDATION
// =============================================================================

fn classify_inbound(connection_id: ConnectionId, msg: Message) -> Outcome {
    let decoded = match &msg {
        Message::Text(text) => frames::decode_text(text.as_str()),
        Message::Binary(bytes) => frames::decode_frame(bytes),
        _ => return Outcome::Ignored,
    };

    let frame = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%connection_id, code = e.error_code(), error = %e, "ws: undecodable frame dropped");
            return Outcome::Rejected;
        }
    };

    if !frame.is_paint() {
        debug!(%connection_id, event = %frame.event, "ws: unknown event ignored");
        return Outcome::Ignored;
    }

    match frame.marker() {
        Ok(marker) => {
            debug!(
                %connection_id,
                position = ?marker.position,
                orientation = ?marker.orientation,
                "ws: recv paint"
            );
            Outcome::Forward(msg)
        }
        Err(e) => {
            warn!(%connection_id, code = e.error_code(), error = %e, "ws: invalid marker dropped");
            Outcome::Rejected
        }
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
