use crate::media::MediaTrack;
use crate::transport::{TransportError, TransportEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tlink_core::{ConnectionId, IceCandidate, IceServerConfig};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque negotiated-capability document exchanged as offer or answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// The real-time media transport for one remote peer.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    /// Attaches captured local tracks so they are negotiated in the next description.
    async fn add_tracks(&self, tracks: &[MediaTrack]) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Builds one [`PeerTransport`] per remote peer. Implementations report
/// gathered candidates and connection failures through `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        peer_id: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
