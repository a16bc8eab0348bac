pub mod test_peer;

pub use mock_media::*;
pub use mock_transport::*;
pub use test_peer::*;
pub use ws_server::*;

use std::sync::Arc;
use tlink_client::NegotiationSession;
use tlink_core::{ClientMessage, ConnectionId, RoomId};
use tokio::sync::mpsc;

pub fn room(id: &str) -> RoomId {
    RoomId::new(id).expect("valid room id")
}

/// A session with `peer` over a fresh [`MockTransport`] answering `O1`/`S1`.
pub fn new_session(
    peer: ConnectionId,
) -> (
    NegotiationSession,
    Arc<MockTransport>,
    mpsc::UnboundedReceiver<ClientMessage>,
) {
    let transport = Arc::new(MockTransport::new("O1", "S1"));
    let (signals, signals_rx) = mpsc::unbounded_channel();
    let session = NegotiationSession::new(room("abc12345"), peer, transport.clone(), signals);
    (session, transport, signals_rx)
}
