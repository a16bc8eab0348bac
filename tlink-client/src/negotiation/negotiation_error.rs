use crate::negotiation::NegotiationState;
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The event does not apply in the current state. The session is untouched.
    #[error("cannot handle {event} in state {state}")]
    InvalidState {
        event: &'static str,
        state: NegotiationState,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
