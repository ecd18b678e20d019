//! Relay handler invoked by the transport for each connection event
//!
//! The handler parses the envelope of every inbound text frame, drives the
//! [`RoomRegistry`] and never reports anything back to the client: failures
//! are logged and the frame is dropped.

use crate::protocol::Envelope;
use crate::state::{ConnectionHandle, ConnectionId, RoomId, RoomRegistry};
use std::sync::Arc;

/// Events a transport delivers for each of its connections.
///
/// Events for one connection arrive in order; events for different
/// connections may arrive concurrently.
pub trait SignalHandler: Send + Sync {
    /// A connection was accepted
    fn on_open(&self, conn: &ConnectionHandle);

    /// A text frame arrived on a connection
    fn on_message(&self, conn: &ConnectionHandle, text: &str) -> Dispatch;

    /// A connection ended, gracefully or not. Returns the room it was in.
    fn on_close(&self, conn_id: &ConnectionId) -> Option<RoomId>;
}

/// Outcome of handling one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The sender joined this room
    Joined(RoomId),
    /// The sender left its room, if it had one
    Left(Option<RoomId>),
    /// The frame was relayed; sends were attempted to this many members
    Forwarded(usize),
    /// The frame was malformed or had nowhere to go
    Dropped,
}

/// Room-based relay: joins on `join`, leaves on `leave`, forwards the rest
#[derive(Clone)]
pub struct RelayHandler {
    registry: Arc<RoomRegistry>,
    default_room: Option<RoomId>,
}

impl RelayHandler {
    /// Create a handler driving `registry`
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            default_room: None,
        }
    }

    /// Join every new connection to `room` as soon as it opens
    pub fn with_default_room(mut self, room: impl Into<RoomId>) -> Self {
        self.default_room = Some(room.into());
        self
    }

    /// The registry this handler drives
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }
}

impl SignalHandler for RelayHandler {
    fn on_open(&self, conn: &ConnectionHandle) {
        if let Some(room) = &self.default_room {
            self.registry.join(Arc::clone(conn), room.clone());
        }
    }

    fn on_message(&self, conn: &ConnectionHandle, text: &str) -> Dispatch {
        let conn_id = conn.id();

        let envelope = match text.parse::<Envelope>() {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(conn_id = %conn_id, %error, "Dropping malformed message");
                return Dispatch::Dropped;
            }
        };

        match envelope {
            Envelope::Join(room) => {
                self.registry.join(Arc::clone(conn), room.clone());
                Dispatch::Joined(room)
            }
            Envelope::Leave => Dispatch::Left(self.registry.leave(&conn_id)),
            Envelope::Relay { room_id } => {
                match self.registry.forward(&conn_id, room_id.as_ref(), text) {
                    Ok(recipients) => Dispatch::Forwarded(recipients),
                    Err(error) => {
                        tracing::warn!(conn_id = %conn_id, %error, "Dropping message");
                        Dispatch::Dropped
                    }
                }
            }
        }
    }

    fn on_close(&self, conn_id: &ConnectionId) -> Option<RoomId> {
        let room = self.registry.leave(conn_id);
        tracing::info!(conn_id = %conn_id, room = ?room, "Connection closed");
        room
    }
}
