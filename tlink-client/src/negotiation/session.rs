use crate::media::MediaTrack;
use crate::negotiation::{CandidateBuffer, NegotiationError, NegotiationState, Role, SessionEvent};
use crate::transport::{PeerTransport, SessionDescription, TransportError};
use std::sync::Arc;
use tlink_core::{ClientMessage, ConnectionId, IceCandidate, RoomId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outgoing relay messages.
pub type SignalSender = mpsc::UnboundedSender<ClientMessage>;

/// Negotiation with one remote peer in one room.
///
/// Every input arrives as a [`SessionEvent`]. Events that do not fit the
/// current state are rejected with [`NegotiationError::InvalidState`] and leave
/// the session untouched; transport errors while building or applying
/// descriptions move it to `Failed`.
pub struct NegotiationSession {
    room_id: RoomId,
    peer_id: ConnectionId,
    role: Role,
    state: NegotiationState,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    candidates: CandidateBuffer,
    tracks: Vec<MediaTrack>,
    offer_deferred: bool,
    transport: Arc<dyn PeerTransport>,
    signals: SignalSender,
}

impl NegotiationSession {
    pub fn new(
        room_id: RoomId,
        peer_id: ConnectionId,
        transport: Arc<dyn PeerTransport>,
        signals: SignalSender,
    ) -> Self {
        Self {
            room_id,
            peer_id,
            role: Role::Unset,
            state: NegotiationState::Idle,
            local_description: None,
            remote_description: None,
            candidates: CandidateBuffer::new(),
            tracks: Vec::new(),
            offer_deferred: false,
            transport,
            signals,
        }
    }

    pub fn peer_id(&self) -> ConnectionId {
        self.peer_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn buffered_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub async fn handle(&mut self, event: SessionEvent) -> Result<(), NegotiationError> {
        match event {
            SessionEvent::PeerJoined => self.start_offer().await,
            SessionEvent::MediaReady(tracks) => self.attach_media(tracks).await,
            SessionEvent::RemoteOffer(sdp) => self.accept_offer(sdp).await,
            SessionEvent::RemoteAnswer(sdp) => self.accept_answer(sdp).await,
            SessionEvent::RemoteCandidate(candidate) => self.add_remote_candidate(candidate).await,
            SessionEvent::LocalCandidate(candidate) => self.send_local_candidate(candidate),
            SessionEvent::TransportConnected => {
                info!("Media path to {} is up ({})", self.peer_id, self.state);
                Ok(())
            }
            SessionEvent::TransportFailed(reason) => {
                self.fail(&reason).await;
                Ok(())
            }
            SessionEvent::PeerLeft | SessionEvent::Close => {
                self.close().await;
                Ok(())
            }
        }
    }

    /// Releases media and buffered candidates and closes the transport.
    pub async fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.release().await;
        self.transition(NegotiationState::Closed);
    }

    pub async fn fail(&mut self, reason: &str) {
        if self.state.is_terminal() {
            return;
        }
        warn!("Session with {} failed: {}", self.peer_id, reason);
        self.release().await;
        self.transition(NegotiationState::Failed);
    }

    async fn attach_media(&mut self, tracks: Vec<MediaTrack>) -> Result<(), NegotiationError> {
        if self.state.is_terminal() {
            return Err(self.invalid("media-ready"));
        }

        let transport = Arc::clone(&self.transport);
        let added = transport.add_tracks(&tracks).await;
        self.guard(added).await?;
        self.tracks.extend(tracks);

        if self.offer_deferred && self.state == NegotiationState::Idle {
            self.offer_deferred = false;
            return self.start_offer().await;
        }
        Ok(())
    }

    async fn start_offer(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle {
            return Err(self.invalid("user-joined"));
        }
        if self.tracks.is_empty() {
            debug!("Local media not ready, deferring offer to {}", self.peer_id);
            self.offer_deferred = true;
            return Ok(());
        }

        self.role = Role::Offerer;
        self.transition(NegotiationState::LocalOfferPending);

        let transport = Arc::clone(&self.transport);
        let offer = transport.create_offer().await;
        let offer = self.guard(offer).await?;
        let applied = transport.set_local_description(offer.clone()).await;
        self.guard(applied).await?;
        self.local_description = Some(offer.clone());

        self.send(ClientMessage::Offer {
            room_id: self.room_id.clone(),
            target: Some(self.peer_id),
            sdp: offer.sdp,
        });
        self.transition(NegotiationState::AwaitingAnswer);
        Ok(())
    }

    async fn accept_offer(&mut self, sdp: String) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle {
            if self.role == Role::Answerer
                && !self.state.is_terminal()
                && self.remote_description.as_ref().is_some_and(|d| d.sdp == sdp)
            {
                debug!("Duplicate offer from {} ignored", self.peer_id);
                return Ok(());
            }
            return Err(self.invalid("offer"));
        }

        self.role = Role::Answerer;
        self.offer_deferred = false;
        self.transition(NegotiationState::AwaitingRemoteOffer);
        self.apply_remote(SessionDescription::offer(sdp)).await?;
        self.transition(NegotiationState::AnswerPending);

        let transport = Arc::clone(&self.transport);
        let answer = transport.create_answer().await;
        let answer = self.guard(answer).await?;
        let applied = transport.set_local_description(answer.clone()).await;
        self.guard(applied).await?;
        self.local_description = Some(answer.clone());

        self.send(ClientMessage::Answer {
            room_id: self.room_id.clone(),
            target: Some(self.peer_id),
            sdp: answer.sdp,
        });
        self.transition(NegotiationState::Connected);
        Ok(())
    }

    async fn accept_answer(&mut self, sdp: String) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::AwaitingAnswer => {
                self.apply_remote(SessionDescription::answer(sdp)).await?;
                self.transition(NegotiationState::Connected);
                Ok(())
            }
            NegotiationState::Connected
                if self.role == Role::Offerer
                    && self.remote_description.as_ref().is_some_and(|d| d.sdp == sdp) =>
            {
                debug!("Duplicate answer from {} ignored", self.peer_id);
                Ok(())
            }
            _ => Err(self.invalid("answer")),
        }
    }

    async fn add_remote_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        if self.state.is_terminal() {
            return Err(self.invalid("ice-candidate"));
        }

        if self.remote_description.is_none() {
            self.candidates.push(candidate);
            debug!(
                "Buffered candidate from {} ({} pending)",
                self.peer_id,
                self.candidates.len()
            );
            return Ok(());
        }

        // A bad candidate is not fatal; other candidates may still connect.
        self.transport
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| {
                warn!("Failed to add candidate from {}: {}", self.peer_id, e);
                NegotiationError::Transport(e)
            })
    }

    fn send_local_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if self.state.is_terminal() {
            return Err(self.invalid("local-candidate"));
        }
        self.send(ClientMessage::IceCandidate {
            room_id: self.room_id.clone(),
            target: Some(self.peer_id),
            candidate,
        });
        Ok(())
    }

    async fn apply_remote(&mut self, desc: SessionDescription) -> Result<(), NegotiationError> {
        let transport = Arc::clone(&self.transport);
        let applied = transport.set_remote_description(desc.clone()).await;
        self.guard(applied).await?;
        self.remote_description = Some(desc);
        self.flush_candidates().await;
        Ok(())
    }

    async fn flush_candidates(&mut self) {
        let pending = self.candidates.drain();
        if pending.is_empty() {
            return;
        }

        debug!("Flushing {} buffered candidate(s) from {}", pending.len(), self.peer_id);
        for candidate in pending {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to add buffered candidate from {}: {}", self.peer_id, e);
            }
        }
    }

    async fn release(&mut self) {
        self.candidates.clear();
        self.tracks.clear();
        self.offer_deferred = false;
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {}: {}", self.peer_id, e);
        }
    }

    async fn guard<T>(&mut self, result: Result<T, TransportError>) -> Result<T, NegotiationError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                self.fail(&e.to_string()).await;
                Err(NegotiationError::Transport(e))
            }
        }
    }

    fn send(&self, msg: ClientMessage) {
        if self.signals.send(msg).is_err() {
            warn!("Relay connection is gone, signal to {} dropped", self.peer_id);
        }
    }

    fn invalid(&self, event: &'static str) -> NegotiationError {
        warn!(
            "Rejected {} from {} in state {}",
            event, self.peer_id, self.state
        );
        NegotiationError::InvalidState {
            event,
            state: self.state,
        }
    }

    fn transition(&mut self, next: NegotiationState) {
        debug!("Session {}: {} -> {}", self.peer_id, self.state, next);
        self.state = next;
    }
}
