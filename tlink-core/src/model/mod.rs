mod connection;
mod error;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use error::ModelError;
pub use room::{MAX_ROOM_ID_LEN, RoomId};
pub use signaling::{ClientMessage, IceCandidate, IceServerConfig, ServerMessage};
