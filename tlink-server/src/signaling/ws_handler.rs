use crate::signaling::SignalingRelay;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tlink_core::ServerMessage;
use tokio::sync::mpsc;
use tracing::{error, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(relay): State<SignalingRelay>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

async fn handle_socket(socket: WebSocket, relay: SignalingRelay) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = relay.connect(tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {} message: {}", msg.kind(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => relay.handle_text(connection_id, text.as_str()).await,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    let recv_finished = tokio::select! {
        _ = (&mut send_task) => false,
        _ = (&mut recv_task) => true,
    };

    // The surviving task may be mid-dispatch; let it stop before cleaning up
    // or a late join would outlive the disconnect.
    if recv_finished {
        send_task.abort();
        let _ = send_task.await;
    } else {
        recv_task.abort();
        let _ = recv_task.await;
    }

    relay.disconnect(&connection_id);
    info!("WebSocket disconnected: {}", connection_id);
}
