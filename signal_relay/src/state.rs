//! Room registry for the signaling relay
//!
//! This module tracks which connections are in which room and routes
//! relayed messages to the other members of a room. State lives in memory
//! only and is shared between connection tasks through an `Arc`.

use crate::error::SignalingError;
use dashmap::{DashMap, mapref::entry::Entry};
use std::{collections::HashMap, fmt, sync::Arc};
use uuid::Uuid;

/// Room identifier
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identity of one live client link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Send capability of a live client link.
///
/// Implemented by the transport. The registry only ever holds these as
/// shared handles and never closes them.
pub trait Connection: Send + Sync {
    /// Identity of this connection
    fn id(&self) -> ConnectionId;

    /// Whether the link still accepts messages
    fn is_open(&self) -> bool;

    /// Hand a text payload to the link without waiting for delivery
    fn send(&self, payload: &str) -> Result<(), SignalingError>;
}

/// Shared handle to a connection
pub type ConnectionHandle = Arc<dyn Connection>;

/// Members of one room, keyed by connection
type Members = HashMap<ConnectionId, ConnectionHandle>;

/// Concurrent mapping of rooms to members and members back to rooms.
///
/// A connection is in at most one room. A room with no members is removed.
/// `rooms[r]` contains `c` exactly when `peers[c] == r`.
#[derive(Default)]
pub struct RoomRegistry {
    /// Map of room -> connections in that room
    rooms: DashMap<RoomId, Members>,
    /// Map of connection -> the room it is in
    peers: DashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room if needed.
    ///
    /// A connection already in another room leaves it first; the room left
    /// is returned. Joining the current room again changes nothing.
    pub fn join(&self, conn: ConnectionHandle, room_id: RoomId) -> Option<RoomId> {
        let conn_id = conn.id();

        let previous = match self.room_of(&conn_id) {
            Some(current) if current == room_id => return None,
            Some(_) => self.leave(&conn_id),
            None => None,
        };

        // Hold the room's entry while recording the reverse mapping so a
        // concurrent last-member leave cannot drop the room in between.
        let mut members = self.rooms.entry(room_id.clone()).or_default();
        members.insert(conn_id, conn);
        self.peers.insert(conn_id, room_id.clone());
        drop(members);

        tracing::info!(conn_id = %conn_id, room = %room_id, "Joined room");

        previous
    }

    /// Remove a connection from its room.
    ///
    /// Returns the room it was in, or `None` if it was not in one. The room
    /// itself is removed once its last member leaves.
    pub fn leave(&self, conn_id: &ConnectionId) -> Option<RoomId> {
        let (_, room_id) = self.peers.remove(conn_id)?;

        if let Entry::Occupied(mut members) = self.rooms.entry(room_id.clone()) {
            members.get_mut().remove(conn_id);
            if members.get().is_empty() {
                members.remove();
                tracing::debug!(room = %room_id, "Removed empty room");
            }
        }

        tracing::info!(conn_id = %conn_id, room = %room_id, "Left room");

        Some(room_id)
    }

    /// Relay a payload to every other open member of the destination room.
    ///
    /// The destination is `room_override` if given, else the sender's
    /// current room. Returns the number of members a send was attempted to.
    /// A failed send to one member is logged and does not stop delivery to
    /// the rest.
    pub fn forward(
        &self,
        sender: &ConnectionId,
        room_override: Option<&RoomId>,
        payload: &str,
    ) -> Result<usize, SignalingError> {
        let room_id = match room_override {
            Some(room_id) => room_id.clone(),
            None => self
                .room_of(sender)
                .ok_or(SignalingError::NoDestination(*sender))?,
        };

        // Snapshot the members so no lock is held while sending
        let recipients: Vec<ConnectionHandle> = self
            .rooms
            .get(&room_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|(id, _)| *id != sender)
                    .map(|(_, conn)| Arc::clone(conn))
                    .collect()
            })
            .ok_or_else(|| SignalingError::UnknownRoom(room_id.clone()))?;

        let mut attempted = 0;
        for recipient in recipients {
            if !recipient.is_open() {
                continue;
            }

            attempted += 1;
            if let Err(error) = recipient.send(payload) {
                tracing::warn!(
                    conn_id = %sender,
                    recipient = %recipient.id(),
                    room = %room_id,
                    %error,
                    "Failed to relay message"
                );
            }
        }

        tracing::debug!(
            conn_id = %sender,
            room = %room_id,
            recipients = attempted,
            "Relayed message"
        );

        Ok(attempted)
    }

    /// The room a connection is currently in
    pub fn room_of(&self, conn_id: &ConnectionId) -> Option<RoomId> {
        self.peers.get(conn_id).map(|room| room.value().clone())
    }

    /// Get all connections in a room
    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of connections in a room
    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|members| members.len()).unwrap_or(0)
    }

    /// Whether a room currently exists
    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of connections that are in some room
    pub fn connection_count(&self) -> usize {
        self.peers.len()
    }
}
