use crate::call::CallError;
use crate::negotiation::NegotiationState;
use tlink_core::{ConnectionId, RoomId};
use tokio::sync::oneshot;

/// Requests from the application to a running [`CallController`](super::CallController).
#[derive(Debug)]
pub enum CallCommand {
    Join {
        room_id: RoomId,
        token: Option<String>,
        done: oneshot::Sender<Result<(), CallError>>,
    },

    Leave {
        done: oneshot::Sender<Result<(), CallError>>,
    },

    /// Current negotiation state per remote peer.
    Snapshot {
        reply: oneshot::Sender<Vec<(ConnectionId, NegotiationState)>>,
    },
}
