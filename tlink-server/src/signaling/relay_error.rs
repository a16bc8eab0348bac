use thiserror::Error;
use tlink_core::{ConnectionId, RoomId};

/// Reasons a relay message is dropped. None of these are fatal to the relay;
/// they are logged at the connection boundary and the socket keeps serving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("connection {sender} is not a member of room {room_id}")]
    NotAMember {
        sender: ConnectionId,
        room_id: RoomId,
    },

    #[error("target {target} is not another member of room {room_id}")]
    UnknownTarget {
        target: ConnectionId,
        room_id: RoomId,
    },

    #[error("join to room {room_id} denied: {reason}")]
    Unauthorized { room_id: RoomId, reason: String },

    #[error("room {room_id} is full ({max} members)")]
    RoomFull { room_id: RoomId, max: usize },
}
