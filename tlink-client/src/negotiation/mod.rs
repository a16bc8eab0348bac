mod candidate_buffer;
mod negotiation_error;
mod session;
mod session_event;
mod state;

pub use candidate_buffer::CandidateBuffer;
pub use negotiation_error::NegotiationError;
pub use session::{NegotiationSession, SignalSender};
pub use session_event::SessionEvent;
pub use state::{NegotiationState, Role};
