use crate::media::MediaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    /// Local media could not be acquired; nothing was sent to the relay.
    #[error("local media unavailable: {0}")]
    Media(#[from] MediaError),

    #[error("not in a room")]
    NotJoined,

    #[error("already in room {0}")]
    AlreadyJoined(String),

    #[error("relay connection closed")]
    RelayClosed,

    #[error("call task stopped")]
    ControllerStopped,
}
