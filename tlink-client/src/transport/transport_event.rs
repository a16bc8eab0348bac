use tlink_core::{ConnectionId, IceCandidate};

/// Events a peer transport reports back to the call controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Trickle ICE: a local candidate to send to the remote peer.
    CandidateGenerated(ConnectionId, IceCandidate),
    Connected(ConnectionId),
    Failed(ConnectionId, String),
}
