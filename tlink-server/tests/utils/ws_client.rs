use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tlink_core::{ClientMessage, ConnectionId, ServerMessage};
use tlink_server::{SignalingRelay, router};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single signal to arrive over the socket (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Serves the relay on an ephemeral local port.
pub async fn spawn_server(relay: SignalingRelay) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(relay)).await {
            tracing::error!("[WsClient] Test server failed: {}", e);
        }
    });
    Ok(addr)
}

pub struct WsClient {
    pub id: ConnectionId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Opens a socket and waits for the `welcome` greeting.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to open WebSocket")?;
        let mut client = Self {
            id: ConnectionId::new(),
            stream,
        };

        match client.recv().await? {
            ServerMessage::Welcome { connection_id, .. } => client.id = connection_id,
            other => anyhow::bail!("Expected welcome, got {:?}", other),
        }
        Ok(client)
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<ServerMessage> {
        let timeout = Duration::from_millis(SIGNAL_TIMEOUT_MS);
        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next())
                .await
                .context("Timeout waiting for signal")?
                .context("Socket closed")??;

            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).context("Invalid server message");
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Socket handlers run on their own tasks; poll until the room settles.
pub async fn wait_for_members(relay: &SignalingRelay, room_id: &tlink_core::RoomId, count: usize) {
    for _ in 0..(SIGNAL_TIMEOUT_MS / 20) {
        if relay.members_of(room_id).len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Room {} never reached {} members", room_id, count);
}

/// Waits until every socket is gone and the room has been deleted.
pub async fn wait_for_cleanup(relay: &SignalingRelay, room_id: &tlink_core::RoomId) {
    for _ in 0..(SIGNAL_TIMEOUT_MS / 20) {
        if relay.connections().is_empty() && !relay.rooms().contains_room(room_id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "Room {} still has members {:?} after all sockets closed",
        room_id,
        relay.members_of(room_id)
    );
}
