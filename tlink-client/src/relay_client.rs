use crate::call::{CallController, CallHandle};
use crate::config::ClientConfig;
use crate::media::LocalMedia;
use crate::negotiation::SignalSender;
use crate::transport::WebRtcTransportFactory;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tlink_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

/// WebSocket link to the signaling relay.
///
/// Outgoing [`ClientMessage`]s are written by a send task and incoming text
/// frames are parsed into [`ServerMessage`]s by a receive task. Both end when
/// the socket closes; the receiver then yields `None`.
pub struct RelayClient {
    pub signals: SignalSender,
    pub messages: mpsc::UnboundedReceiver<ServerMessage>,
    pub task: JoinHandle<()>,
}

impl RelayClient {
    pub async fn connect(url: &str) -> Result<Self, WsError> {
        let (stream, _) = connect_async(url).await?;
        info!("Connected to relay at {}", url);

        let (mut sender, mut receiver) = stream.split();
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (message_tx, message_rx) = mpsc::unbounded_channel::<ServerMessage>();

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = signal_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize {}: {}", msg.kind(), e);
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sender.close().await;
        });

        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(frame)) = receiver.next().await {
                match frame {
                    Message::Text(text) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if message_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Unparseable relay message: {}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };
            debug!("Relay connection closed");
        });

        Ok(Self {
            signals: signal_tx,
            messages: message_rx,
            task,
        })
    }

    /// Connects to the configured relay and spawns a [`CallController`] backed
    /// by `webrtc` peer connections.
    pub async fn start_call(
        config: &ClientConfig,
        media: Arc<dyn LocalMedia>,
    ) -> Result<(CallHandle, JoinHandle<()>), StartError> {
        let relay = Self::connect(&config.relay_url).await?;
        let transports = Arc::new(WebRtcTransportFactory::new(config.ice_servers.clone()));

        let controller = CallController::new(media, transports, relay.signals)
            .with_ice_servers(config.ice_servers.clone());
        Ok(CallHandle::spawn(controller, relay.messages))
    }
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("relay connection failed: {0}")]
    Relay(#[from] WsError),
}
