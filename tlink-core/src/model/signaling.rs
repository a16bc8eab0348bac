use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Connectivity candidate in the browser `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

/// Messages a client sends to the relay.
///
/// `target` addresses one member of the room. When it is absent the relay
/// forwards to every other member, which is only meaningful for two-party rooms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    Offer {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        sdp: String,
    },
    Answer {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        sdp: String,
    },
    IceCandidate {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        candidate: IceCandidate,
    },
}

impl ClientMessage {
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::LeaveRoom { room_id }
            | Self::Offer { room_id, .. }
            | Self::Answer { room_id, .. }
            | Self::IceCandidate { room_id, .. } => room_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
        }
    }
}

/// Messages the relay sends to a client. `sender_id` is always filled in by
/// the relay from the originating connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
        #[serde(default)]
        ice_servers: Vec<IceServerConfig>,
    },
    UserJoined {
        room_id: RoomId,
        sender_id: ConnectionId,
    },
    UserLeft {
        room_id: RoomId,
        sender_id: ConnectionId,
    },
    Offer {
        room_id: RoomId,
        sender_id: ConnectionId,
        sdp: String,
    },
    Answer {
        room_id: RoomId,
        sender_id: ConnectionId,
        sdp: String,
    },
    IceCandidate {
        room_id: RoomId,
        sender_id: ConnectionId,
        candidate: IceCandidate,
    },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
        }
    }
}
