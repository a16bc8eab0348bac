mod peer_transport;
mod transport_error;
mod transport_event;
mod webrtc_transport;

pub use peer_transport::*;
pub use transport_error::*;
pub use transport_event::*;
pub use webrtc_transport::*;
