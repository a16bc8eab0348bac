use crate::utils::{MockMedia, MockTransportFactory};
use std::sync::Arc;
use tlink_client::CallController;
use tlink_core::{ClientMessage, ConnectionId, ServerMessage};
use tlink_server::SignalingRelay;
use tokio::sync::mpsc;

/// A call controller wired to an in-process relay through plain channels.
/// Nothing moves until [`pump`] (or the flush helpers) is called.
pub struct TestPeer {
    pub id: ConnectionId,
    pub controller: CallController,
    pub media: Arc<MockMedia>,
    pub transports: Arc<MockTransportFactory>,
    signals_rx: mpsc::UnboundedReceiver<ClientMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestPeer {
    /// Connects with granted media; descriptions are `O1`/`S1`.
    pub async fn connect(relay: &SignalingRelay, name: &str) -> Self {
        Self::connect_with(relay, MockMedia::granted(name), "O1", "S1").await
    }

    pub async fn connect_with(
        relay: &SignalingRelay,
        media: MockMedia,
        offer_sdp: &str,
        answer_sdp: &str,
    ) -> Self {
        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let id = relay.connect(server_tx);

        let (signals, signals_rx) = mpsc::unbounded_channel();
        let media = Arc::new(media);
        let transports = Arc::new(MockTransportFactory::new(offer_sdp, answer_sdp));
        let controller = CallController::new(media.clone(), transports.clone(), signals);

        let mut peer = Self {
            id,
            controller,
            media,
            transports,
            signals_rx,
            server_rx,
        };
        peer.process_incoming().await;
        assert_eq!(peer.controller.local_id(), Some(id));
        peer
    }

    /// Hands queued outgoing signals to the relay.
    pub async fn flush_outgoing(&mut self, relay: &SignalingRelay) -> usize {
        let mut moved = 0;
        while let Ok(msg) = self.signals_rx.try_recv() {
            relay.handle(self.id, msg).await;
            moved += 1;
        }
        moved
    }

    /// Feeds queued relay messages to the controller.
    pub async fn process_incoming(&mut self) -> usize {
        let mut moved = 0;
        while let Ok(msg) = self.server_rx.try_recv() {
            self.controller.handle_server_message(msg).await;
            moved += 1;
        }
        moved
    }

    /// Outgoing signals not yet handed to the relay.
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.signals_rx.try_recv() {
            messages.push(msg);
        }
        messages
    }
}

/// Moves messages between peers and the relay until nothing is in flight.
pub async fn pump(relay: &SignalingRelay, peers: &mut [&mut TestPeer]) {
    loop {
        let mut moved = 0;
        for peer in peers.iter_mut() {
            moved += peer.flush_outgoing(relay).await;
        }
        for peer in peers.iter_mut() {
            moved += peer.process_incoming().await;
        }
        if moved == 0 {
            break;
        }
    }
}
