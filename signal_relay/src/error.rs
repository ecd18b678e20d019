//! Error types for the signaling relay

use crate::state::{ConnectionId, RoomId};
use thiserror::Error;

/// Errors that can occur while routing or delivering a message
#[derive(Error, Debug)]
pub enum SignalingError {
    /// The recipient's connection is already closed
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),

    /// The recipient's outbound queue has no room left
    #[error("Outbound queue for connection {0} is full")]
    QueueFull(ConnectionId),

    /// The sender is not in a room and named no destination
    #[error("No destination room for connection {0}")]
    NoDestination(ConnectionId),

    /// The destination room has no members
    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),
}

/// Errors from client requests
#[derive(Error, Debug)]
pub enum ClientRequestError {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload parsed but is not a JSON object
    #[error("Envelope is not a JSON object")]
    NotAnObject,

    /// A recognized field carries a value of the wrong type
    #[error("Field `{0}` has an invalid value")]
    InvalidField(&'static str),

    /// A room identifier field is present but empty
    #[error("Field `{0}` must not be empty")]
    EmptyRoomId(&'static str),

    /// Binary frames are not part of the protocol
    #[error("Unsupported message type")]
    UnsupportedType,
}
