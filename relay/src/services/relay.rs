//! Relay service: connection registry and fan-out.
//!
//! DESIGN
//! ======
//! A connection is registered when its socket is upgraded and unregistered
//! when its loop exits. Fan-out hands the inbound message to every other
//! registered connection's queue. Nothing is stored, so a connection that
//! registers later never sees earlier markers.
//!
//! Delivery is at-most-once. A peer whose queue is full or closed simply
//! misses the message; the sender is never told.

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{AppState, ConnectionId};

// =============================================================================
// CONNECT / DISCONNECT
// =============================================================================

/// Add a connection to the active set and return its new id.
pub async fn register(state: &AppState, tx: mpsc::Sender<Message>) -> ConnectionId {
    let connection_id = Uuid::new_v4();
    let mut connections = state.connections.write().await;
    connections.insert(connection_id, tx);
    info!(%connection_id, peers = connections.len(), "ws: user connected");
    connection_id
}

/// Remove a connection from the active set. Peers are not notified.
/// Returns `false` if the connection was not registered.
pub async fn unregister(state: &AppState, connection_id: ConnectionId) -> bool {
    let mut connections = state.connections.write().await;
    let removed = connections.remove(&connection_id).is_some();
    info!(%connection_id, peers = connections.len(), "ws: user disconnected");
    removed
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Forward `message` to every registered connection except `exclude`.
/// Returns how many peer queues accepted it.
pub async fn broadcast(state: &AppState, message: &Message, exclude: Option<ConnectionId>) -> usize {
    let connections = state.connections.read().await;

    let mut delivered = 0;
    for (connection_id, tx) in connections.iter() {
        if exclude == Some(*connection_id) {
            continue;
        }
        // Best-effort: a full or closed queue drops the message for that peer.
        match tx.try_send(message.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                debug!(%connection_id, "peer queue full; message dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%connection_id, "peer queue closed; message dropped");
            }
        }
    }
    delivered
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
