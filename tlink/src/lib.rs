//! Peer-to-peer voice call negotiation: a room-scoped signaling relay and the
//! client-side offer/answer state machine that drives it.

pub use tlink_core::{ConnectionId, RoomId};

pub mod model {
    pub use tlink_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tlink_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tlink_client::*;
}
