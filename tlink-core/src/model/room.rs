use crate::model::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const MAX_ROOM_ID_LEN: usize = 64;

const GENERATED_LEN: usize = 8;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Caller-supplied rendezvous name. Never empty, at most [`MAX_ROOM_ID_LEN`] chars.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyRoomId);
        }
        if trimmed.chars().count() > MAX_ROOM_ID_LEN {
            return Err(ModelError::RoomIdTooLong {
                max: MAX_ROOM_ID_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Random 8-character lowercase base-36 id, the format handed out by the
    /// "create room" flow.
    pub fn generate() -> Self {
        let mut bits = Uuid::new_v4().as_u128();
        let mut id = String::with_capacity(GENERATED_LEN);
        for _ in 0..GENERATED_LEN {
            id.push(ALPHABET[(bits % 36) as usize] as char);
            bits /= 36;
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RoomId {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
