use async_trait::async_trait;
use tlink_core::{ConnectionId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

/// Capability check consulted before a connection may join a room.
#[async_trait]
pub trait RoomAuthorizer: Send + Sync {
    async fn authorize(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        token: Option<&str>,
    ) -> Decision;
}

/// Admits everyone. Participants are not authenticated unless another
/// authorizer is configured.
pub struct AllowAll;

#[async_trait]
impl RoomAuthorizer for AllowAll {
    async fn authorize(
        &self,
        _connection_id: ConnectionId,
        _room_id: &RoomId,
        _token: Option<&str>,
    ) -> Decision {
        Decision::Allow
    }
}

/// Admits joins that present one deployment-wide shared token.
pub struct SharedTokenAuthorizer {
    token: String,
}

impl SharedTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl RoomAuthorizer for SharedTokenAuthorizer {
    async fn authorize(
        &self,
        _connection_id: ConnectionId,
        _room_id: &RoomId,
        token: Option<&str>,
    ) -> Decision {
        match token {
            Some(presented) if presented == self.token => Decision::Allow,
            Some(_) => Decision::Deny("invalid join token".into()),
            None => Decision::Deny("join token required".into()),
        }
    }
}
