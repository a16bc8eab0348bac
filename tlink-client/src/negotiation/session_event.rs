use crate::media::MediaTrack;
use tlink_core::IceCandidate;

/// Inputs that drive one [`NegotiationSession`](super::NegotiationSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The remote peer joined after us; we originate the offer.
    PeerJoined,
    MediaReady(Vec<MediaTrack>),
    RemoteOffer(String),
    RemoteAnswer(String),
    RemoteCandidate(IceCandidate),
    LocalCandidate(IceCandidate),
    TransportConnected,
    TransportFailed(String),
    PeerLeft,
    Close,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PeerJoined => "user-joined",
            Self::MediaReady(_) => "media-ready",
            Self::RemoteOffer(_) => "offer",
            Self::RemoteAnswer(_) => "answer",
            Self::RemoteCandidate(_) => "ice-candidate",
            Self::LocalCandidate(_) => "local-candidate",
            Self::TransportConnected => "transport-connected",
            Self::TransportFailed(_) => "transport-failed",
            Self::PeerLeft => "user-left",
            Self::Close => "close",
        }
    }
}
