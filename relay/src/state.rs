//! Shared relay state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the registry of live connections: connection id -> sender for that
//! connection's outbound queue. The registry is the only shared mutable state
//! in the relay. Connect/disconnect take the write lock; fan-out takes the
//! read lock.
//!
//! Nothing here outlives a connection. There are no rooms; every connection
//! is a member of one implicit broadcast group.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Opaque id assigned to a connection at connect time.
pub type ConnectionId = Uuid;

/// Live connections: `connection_id` -> sender for outgoing messages.
pub type Connections = HashMap<ConnectionId, mpsc::Sender<Message>>;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub connections: Arc<RwLock<Connections>>,
    /// Depth of each connection's outbound queue.
    pub client_queue_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(client_queue_capacity: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            client_queue_capacity: client_queue_capacity.max(1),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
