use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tlink_core::{ConnectionId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Outbound queue of a single connection. The socket writer task drains it.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

struct ConnectionEntry {
    tx: Outbound,
    live: AtomicBool,
}

/// Live transport connections, addressable by [`ConnectionId`].
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tx: Outbound) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                tx,
                live: AtomicBool::new(true),
            },
        );
        debug!("Registered connection {}", connection_id);
        connection_id
    }

    /// Removes the connection. Unknown ids are a no-op and return `false`.
    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.connections.remove(connection_id).is_some();
        if removed {
            debug!("Unregistered connection {}", connection_id);
        }
        removed
    }

    pub fn is_live(&self, connection_id: &ConnectionId) -> bool {
        self.connections
            .get(connection_id)
            .is_some_and(|entry| entry.live.load(Ordering::Acquire) && !entry.tx.is_closed())
    }

    /// Queues a message for delivery. A closed queue marks the connection dead.
    pub fn send(&self, connection_id: &ConnectionId, msg: ServerMessage) -> bool {
        let Some(entry) = self.connections.get(connection_id) else {
            warn!(
                "Attempted to send {} to unknown connection {}",
                msg.kind(),
                connection_id
            );
            return false;
        };

        if entry.tx.send(msg).is_err() {
            entry.live.store(false, Ordering::Release);
            warn!("Outbound queue of {} is closed", connection_id);
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
