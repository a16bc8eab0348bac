use crate::signaling::RelayError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tlink_core::{ConnectionId, RoomId};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Members in join order, including the joining connection.
    pub members: Vec<ConnectionId>,
    /// `false` when the connection was already a member and nothing changed.
    pub newly_joined: bool,
}

/// Room id -> members in join order.
///
/// A room id maps either to a non-empty member list or to nothing. Each
/// read-modify-write of a room's members runs under that entry's shard lock,
/// so joins and leaves on one room are serialized while other rooms proceed.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Vec<ConnectionId>>,
    memberships: DashMap<ConnectionId, Vec<RoomId>>,
    max_members: Option<usize>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps room size. `None` or `Some(0)` means unlimited.
    pub fn with_max_members(max_members: Option<usize>) -> Self {
        Self {
            max_members: max_members.filter(|max| *max > 0),
            ..Self::default()
        }
    }

    pub fn join(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
    ) -> Result<JoinOutcome, RelayError> {
        let members = {
            let mut entry = self.rooms.entry(room_id.clone()).or_default();

            if entry.contains(&connection_id) {
                return Ok(JoinOutcome {
                    members: entry.value().clone(),
                    newly_joined: false,
                });
            }

            if let Some(max) = self.max_members
                && entry.len() >= max
            {
                return Err(RelayError::RoomFull {
                    room_id: room_id.clone(),
                    max,
                });
            }

            if entry.is_empty() {
                info!("Creating new room: {}", room_id);
            }
            entry.push(connection_id);
            entry.value().clone()
        };

        self.memberships
            .entry(connection_id)
            .or_default()
            .push(room_id.clone());

        Ok(JoinOutcome {
            members,
            newly_joined: true,
        })
    }

    /// Removes the connection from the room and returns the remaining members,
    /// or `None` when it was not a member. An emptied room is deleted.
    pub fn leave(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let remaining = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let members = entry.get_mut();
                let before = members.len();
                members.retain(|member| member != connection_id);
                if members.len() == before {
                    return None;
                }

                let remaining = members.clone();
                if remaining.is_empty() {
                    entry.remove();
                    info!("Room {} is empty, removing", room_id);
                }
                remaining
            }
            Entry::Vacant(_) => return None,
        };

        if let Some(mut rooms) = self.memberships.get_mut(connection_id) {
            rooms.retain(|room| room != room_id);
        }
        self.memberships
            .remove_if(connection_id, |_, rooms| rooms.is_empty());

        Some(remaining)
    }

    /// Leaves every room the connection belongs to. Returns each left room with
    /// its remaining members (empty when the room was deleted).
    pub fn leave_all(&self, connection_id: &ConnectionId) -> Vec<(RoomId, Vec<ConnectionId>)> {
        let rooms = self
            .memberships
            .remove(connection_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();

        rooms
            .into_iter()
            .filter_map(|room_id| {
                self.leave(&room_id, connection_id)
                    .map(|remaining| (room_id, remaining))
            })
            .collect()
    }

    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.memberships
            .get(connection_id)
            .map(|rooms| rooms.value().clone())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
