use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{operation} failed: {reason}")]
    Operation {
        operation: &'static str,
        reason: String,
    },

    #[error("peer connection is closed")]
    Closed,

    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),
}

impl TransportError {
    pub fn operation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            reason: reason.into(),
        }
    }
}
