use crate::call::{CallCommand, CallError};
use crate::media::{LocalMedia, MediaTrack};
use crate::negotiation::{NegotiationSession, NegotiationState, SessionEvent, SignalSender};
use crate::transport::{TransportEvent, TransportFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tlink_core::{ClientMessage, ConnectionId, IceServerConfig, RoomId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Owns every [`NegotiationSession`] of the local peer in one room, keyed by
/// the remote peer's connection id.
///
/// All inputs (application commands, relay messages, transport events) are
/// handled one at a time, so session state is never shared.
pub struct CallController {
    room_id: Option<RoomId>,
    local_id: Option<ConnectionId>,
    ice_servers: Vec<IceServerConfig>,
    tracks: Vec<MediaTrack>,
    sessions: HashMap<ConnectionId, NegotiationSession>,
    media: Arc<dyn LocalMedia>,
    transports: Arc<dyn TransportFactory>,
    signals: SignalSender,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl CallController {
    pub fn new(
        media: Arc<dyn LocalMedia>,
        transports: Arc<dyn TransportFactory>,
        signals: SignalSender,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        Self {
            room_id: None,
            local_id: None,
            ice_servers: Vec::new(),
            tracks: Vec::new(),
            sessions: HashMap::new(),
            media,
            transports,
            signals,
            transport_tx,
            transport_rx,
        }
    }

    /// ICE servers used until the relay advertises its own in `welcome`.
    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn state_of(&self, peer: &ConnectionId) -> Option<NegotiationState> {
        self.sessions.get(peer).map(|s| s.state())
    }

    pub fn session(&self, peer: &ConnectionId) -> Option<&NegotiationSession> {
        self.sessions.get(peer)
    }

    pub fn peers(&self) -> Vec<ConnectionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn states(&self) -> Vec<(ConnectionId, NegotiationState)> {
        self.sessions
            .iter()
            .map(|(peer, session)| (*peer, session.state()))
            .collect()
    }

    /// Acquires local media, then asks the relay to join `room_id`. If media
    /// cannot be acquired nothing is sent.
    pub async fn join(&mut self, room_id: RoomId, token: Option<String>) -> Result<(), CallError> {
        if let Some(current) = &self.room_id {
            return Err(CallError::AlreadyJoined(current.to_string()));
        }

        let tracks = self.media.acquire().await.map_err(|e| {
            warn!("Cannot join {}: {}", room_id, e);
            CallError::Media(e)
        })?;

        let msg = ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            token,
        };
        if self.signals.send(msg).is_err() {
            self.media.release(tracks).await;
            return Err(CallError::RelayClosed);
        }

        info!("Joining room {} with {} local track(s)", room_id, tracks.len());
        self.tracks = tracks;
        self.room_id = Some(room_id);
        Ok(())
    }

    /// Closes every session, stops local media and tells the relay.
    pub async fn leave(&mut self) -> Result<(), CallError> {
        let Some(room_id) = self.room_id.take() else {
            return Err(CallError::NotJoined);
        };

        for (_, mut session) in self.sessions.drain() {
            session.close().await;
        }
        let tracks = std::mem::take(&mut self.tracks);
        self.media.release(tracks).await;

        info!("Leaving room {}", room_id);
        self.signals
            .send(ClientMessage::LeaveRoom { room_id })
            .map_err(|_| CallError::RelayClosed)
    }

    pub async fn handle_server_message(&mut self, msg: ServerMessage) {
        debug!("Relay -> {}", msg.kind());
        self.evict_finished();

        match msg {
            ServerMessage::Welcome {
                connection_id,
                ice_servers,
            } => {
                info!("Relay assigned connection id {}", connection_id);
                self.local_id = Some(connection_id);
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
            }

            ServerMessage::UserJoined { room_id, sender_id } => {
                if !self.accepts(&room_id, sender_id) {
                    return;
                }
                if self.is_active(&sender_id) {
                    debug!("Already negotiating with {}", sender_id);
                    return;
                }
                info!("Peer {} joined {}, sending offer", sender_id, room_id);
                self.deliver_new(sender_id, SessionEvent::PeerJoined).await;
            }

            ServerMessage::Offer {
                room_id,
                sender_id,
                sdp,
            } => {
                if !self.accepts(&room_id, sender_id) {
                    return;
                }
                if self.is_active(&sender_id) {
                    self.deliver(sender_id, SessionEvent::RemoteOffer(sdp)).await;
                } else {
                    self.deliver_new(sender_id, SessionEvent::RemoteOffer(sdp)).await;
                }
            }

            ServerMessage::Answer {
                room_id,
                sender_id,
                sdp,
            } => {
                if !self.accepts(&room_id, sender_id) {
                    return;
                }
                self.deliver(sender_id, SessionEvent::RemoteAnswer(sdp)).await;
            }

            ServerMessage::IceCandidate {
                room_id,
                sender_id,
                candidate,
            } => {
                if !self.accepts(&room_id, sender_id) {
                    return;
                }
                // Candidates follow the sender's offer, so one without a live
                // session belongs to a peer that already left.
                if !self.is_active(&sender_id) {
                    debug!("No live session with {}, dropping ice-candidate", sender_id);
                    return;
                }
                self.deliver(sender_id, SessionEvent::RemoteCandidate(candidate)).await;
            }

            ServerMessage::UserLeft { room_id, sender_id } => {
                if !self.accepts(&room_id, sender_id) {
                    return;
                }
                info!("Peer {} left {}", sender_id, room_id);
                self.deliver(sender_id, SessionEvent::PeerLeft).await;
            }
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(peer, candidate) => {
                self.deliver(peer, SessionEvent::LocalCandidate(candidate)).await;
            }
            TransportEvent::Connected(peer) => {
                self.deliver(peer, SessionEvent::TransportConnected).await;
            }
            TransportEvent::Failed(peer, reason) => {
                error!("Transport to {} failed: {}", peer, reason);
                self.deliver(peer, SessionEvent::TransportFailed(reason)).await;
            }
        }
    }

    pub async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::Join {
                room_id,
                token,
                done,
            } => {
                let _ = done.send(self.join(room_id, token).await);
            }
            CallCommand::Leave { done } => {
                let _ = done.send(self.leave().await);
            }
            CallCommand::Snapshot { reply } => {
                let _ = reply.send(self.states());
            }
        }
    }

    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<CallCommand>,
        mut server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        info!("Call event loop started");

        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Leaving call.");
                            break;
                        }
                    }
                }

                msg = server_rx.recv() => {
                    match msg {
                        Some(m) => self.handle_server_message(m).await,
                        None => {
                            warn!("Relay connection closed");
                            break;
                        }
                    }
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }
            }
        }

        if self.room_id.is_some() {
            let _ = self.leave().await;
        }
        info!("Call event loop finished");
    }

    fn accepts(&self, room_id: &RoomId, sender_id: ConnectionId) -> bool {
        if self.room_id.as_ref() != Some(room_id) {
            debug!("Ignoring message for room {}", room_id);
            return false;
        }
        if self.local_id == Some(sender_id) {
            debug!("Ignoring own message echoed by the relay");
            return false;
        }
        true
    }

    /// Drops sessions that reached `Closed` or `Failed`. Runs before each relay
    /// message, so a finished session stays readable until the next one.
    fn evict_finished(&mut self) {
        self.sessions.retain(|peer, session| {
            let finished = session.state().is_terminal();
            if finished {
                debug!("Evicting {} session with {}", session.state(), peer);
            }
            !finished
        });
    }

    fn is_active(&self, peer: &ConnectionId) -> bool {
        self.sessions
            .get(peer)
            .is_some_and(|s| !s.state().is_terminal())
    }

    async fn deliver(&mut self, peer: ConnectionId, event: SessionEvent) {
        let Some(session) = self.sessions.get_mut(&peer) else {
            warn!("No session with {}, dropping {}", peer, event.name());
            return;
        };

        let name = event.name();
        if let Err(e) = session.handle(event).await {
            warn!("Session with {} rejected {}: {}", peer, name, e);
        }
    }

    /// Starts a fresh session with `peer` and hands it the local tracks before
    /// `event`.
    async fn deliver_new(&mut self, peer: ConnectionId, event: SessionEvent) {
        let Some(room_id) = self.room_id.clone() else {
            return;
        };

        let transport = match self
            .transports
            .create(peer, &self.ice_servers, self.transport_tx.clone())
            .await
        {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create transport for {}: {}", peer, e);
                return;
            }
        };

        let mut session = NegotiationSession::new(room_id, peer, transport, self.signals.clone());
        if !self.tracks.is_empty()
            && let Err(e) = session
                .handle(SessionEvent::MediaReady(self.tracks.clone()))
                .await
        {
            warn!("Failed to attach media for {}: {}", peer, e);
        }

        let name = event.name();
        if let Err(e) = session.handle(event).await {
            warn!("Session with {} rejected {}: {}", peer, name, e);
        }
        self.sessions.insert(peer, session);
    }
}
