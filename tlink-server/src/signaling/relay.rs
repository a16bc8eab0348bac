use crate::registry::{ConnectionRegistry, Outbound};
use crate::room::RoomRegistry;
use crate::signaling::{AllowAll, Decision, RelayError, RoomAuthorizer};
use std::sync::Arc;
use tlink_core::{ClientMessage, ConnectionId, IceServerConfig, RoomId, ServerMessage};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct RelaySettings {
    /// Handed to every client in its `welcome` message.
    pub ice_servers: Vec<IceServerConfig>,
    pub max_room_members: Option<usize>,
}

struct RelayInner {
    connections: ConnectionRegistry,
    rooms: RoomRegistry,
    authorizer: Arc<dyn RoomAuthorizer>,
    ice_servers: Vec<IceServerConfig>,
}

/// Routes signaling messages between members of the same room.
///
/// The relay only looks at the room id, the optional target and the sender
/// identity; session descriptions and candidates pass through untouched.
#[derive(Clone)]
pub struct SignalingRelay {
    inner: Arc<RelayInner>,
}

impl Default for SignalingRelay {
    fn default() -> Self {
        Self::new(RelaySettings::default(), Arc::new(AllowAll))
    }
}

impl SignalingRelay {
    pub fn new(settings: RelaySettings, authorizer: Arc<dyn RoomAuthorizer>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                connections: ConnectionRegistry::new(),
                rooms: RoomRegistry::with_max_members(settings.max_room_members),
                authorizer,
                ice_servers: settings.ice_servers,
            }),
        }
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.inner.connections
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.inner.rooms
    }

    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.inner.rooms.members_of(room_id)
    }

    /// Registers a new connection and greets it with its assigned id.
    pub fn connect(&self, tx: Outbound) -> ConnectionId {
        let connection_id = self.inner.connections.register(tx);
        self.inner.connections.send(
            &connection_id,
            ServerMessage::Welcome {
                connection_id,
                ice_servers: self.inner.ice_servers.clone(),
            },
        );
        info!("New client connected: {}", connection_id);
        connection_id
    }

    /// Drops the connection and leaves every room it was in, telling the
    /// remaining members that it is gone.
    pub fn disconnect(&self, connection_id: &ConnectionId) {
        if !self.inner.connections.unregister(connection_id) {
            return;
        }

        for (room_id, remaining) in self.inner.rooms.leave_all(connection_id) {
            info!("Connection {} left room {} (disconnect)", connection_id, room_id);
            self.notify_left(&room_id, *connection_id, &remaining);
        }
        info!("Client disconnected: {}", connection_id);
    }

    /// Parses and handles one raw text frame. Malformed frames are logged and dropped.
    pub async fn handle_text(&self, sender: ConnectionId, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.handle(sender, msg).await,
            Err(e) => {
                let err = RelayError::Malformed(e.to_string());
                warn!("Dropped frame from {}: {}", sender, err);
            }
        }
    }

    pub async fn handle(&self, sender: ConnectionId, msg: ClientMessage) {
        let kind = msg.kind();
        if let Err(e) = self.dispatch(sender, msg).await {
            warn!("Dropped {} from {}: {}", kind, sender, e);
        }
    }

    pub async fn dispatch(
        &self,
        sender: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RelayError> {
        if !self.inner.connections.is_live(&sender) {
            return Err(RelayError::UnknownConnection(sender));
        }

        match msg {
            ClientMessage::JoinRoom { room_id, token } => {
                self.join(sender, room_id, token.as_deref()).await
            }
            ClientMessage::LeaveRoom { room_id } => self.leave(sender, &room_id),
            ClientMessage::Offer {
                room_id,
                target,
                sdp,
            } => {
                let out = ServerMessage::Offer {
                    room_id: room_id.clone(),
                    sender_id: sender,
                    sdp,
                };
                self.forward(sender, &room_id, target, out)
            }
            ClientMessage::Answer {
                room_id,
                target,
                sdp,
            } => {
                let out = ServerMessage::Answer {
                    room_id: room_id.clone(),
                    sender_id: sender,
                    sdp,
                };
                self.forward(sender, &room_id, target, out)
            }
            ClientMessage::IceCandidate {
                room_id,
                target,
                candidate,
            } => {
                let out = ServerMessage::IceCandidate {
                    room_id: room_id.clone(),
                    sender_id: sender,
                    candidate,
                };
                self.forward(sender, &room_id, target, out)
            }
        }
    }

    async fn join(
        &self,
        sender: ConnectionId,
        room_id: RoomId,
        token: Option<&str>,
    ) -> Result<(), RelayError> {
        if let Decision::Deny(reason) = self
            .inner
            .authorizer
            .authorize(sender, &room_id, token)
            .await
        {
            return Err(RelayError::Unauthorized { room_id, reason });
        }

        let outcome = self.inner.rooms.join(&room_id, sender)?;
        if !outcome.newly_joined {
            debug!("Connection {} already in room {}", sender, room_id);
            return Ok(());
        }

        info!("Socket {} joined room {}", sender, room_id);
        for member in outcome.members.iter().filter(|member| **member != sender) {
            self.inner.connections.send(
                member,
                ServerMessage::UserJoined {
                    room_id: room_id.clone(),
                    sender_id: sender,
                },
            );
        }
        Ok(())
    }

    fn leave(&self, sender: ConnectionId, room_id: &RoomId) -> Result<(), RelayError> {
        let remaining = self
            .inner
            .rooms
            .leave(room_id, &sender)
            .ok_or_else(|| RelayError::NotAMember {
                sender,
                room_id: room_id.clone(),
            })?;

        info!("Socket {} left room {}", sender, room_id);
        self.notify_left(room_id, sender, &remaining);
        Ok(())
    }

    fn notify_left(&self, room_id: &RoomId, departed: ConnectionId, remaining: &[ConnectionId]) {
        for member in remaining {
            self.inner.connections.send(
                member,
                ServerMessage::UserLeft {
                    room_id: room_id.clone(),
                    sender_id: departed,
                },
            );
        }
    }

    fn forward(
        &self,
        sender: ConnectionId,
        room_id: &RoomId,
        target: Option<ConnectionId>,
        msg: ServerMessage,
    ) -> Result<(), RelayError> {
        let members = self.inner.rooms.members_of(room_id);
        if !members.contains(&sender) {
            return Err(RelayError::NotAMember {
                sender,
                room_id: room_id.clone(),
            });
        }

        let targets: Vec<ConnectionId> = match target {
            Some(target) if target != sender && members.contains(&target) => vec![target],
            Some(target) => {
                return Err(RelayError::UnknownTarget {
                    target,
                    room_id: room_id.clone(),
                });
            }
            None => members.into_iter().filter(|m| *m != sender).collect(),
        };

        debug!(
            "Relaying {} from {} in room {} to {} peer(s)",
            msg.kind(),
            sender,
            room_id,
            targets.len()
        );
        for target in &targets {
            self.inner.connections.send(target, msg.clone());
        }
        Ok(())
    }
}
