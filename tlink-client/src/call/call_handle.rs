use crate::call::{CallCommand, CallController, CallError};
use crate::negotiation::NegotiationState;
use tlink_core::{ConnectionId, RoomId, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Cloneable front end of a spawned [`CallController`].
#[derive(Debug, Clone)]
pub struct CallHandle {
    commands: mpsc::Sender<CallCommand>,
}

impl CallHandle {
    /// Spawns the controller's event loop. Dropping every handle leaves the
    /// room and stops the loop.
    pub fn spawn(
        controller: CallController,
        server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(controller.run(rx, server_rx));
        (Self { commands: tx }, task)
    }

    pub async fn join(&self, room_id: RoomId, token: Option<String>) -> Result<(), CallError> {
        let (done, rx) = oneshot::channel();
        self.request(CallCommand::Join {
            room_id,
            token,
            done,
        })
        .await?;
        rx.await.map_err(|_| CallError::ControllerStopped)?
    }

    pub async fn leave(&self) -> Result<(), CallError> {
        let (done, rx) = oneshot::channel();
        self.request(CallCommand::Leave { done }).await?;
        rx.await.map_err(|_| CallError::ControllerStopped)?
    }

    pub async fn states(&self) -> Result<Vec<(ConnectionId, NegotiationState)>, CallError> {
        let (reply, rx) = oneshot::channel();
        self.request(CallCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| CallError::ControllerStopped)
    }

    async fn request(&self, cmd: CallCommand) -> Result<(), CallError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| CallError::ControllerStopped)
    }
}
