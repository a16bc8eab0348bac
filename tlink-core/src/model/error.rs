use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id is longer than {max} characters")]
    RoomIdTooLong { max: usize },

    #[error("invalid connection id `{0}`")]
    InvalidConnectionId(String),
}
