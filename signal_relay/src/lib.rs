//! Room-based WebRTC signaling relay
//!
//! Clients hold a WebSocket open to the relay, join a named room, and every
//! other message they send is forwarded verbatim to the other members of
//! that room. The relay never looks inside offers, answers or ICE
//! candidates; it only reads a small control envelope.
//!
//! # Protocol
//!
//! - **GET /ws** - WebSocket signaling endpoint
//! - **GET /health** - Health check
//!
//! ## Requests (client → server)
//!
//! JSON object text frames:
//! - `{"join": "<room>"}` - Join a room, leaving the current one. Not relayed.
//! - `{"leave": true}` - Leave the current room. Not relayed.
//! - `{..., "roomId": "<room>"}` - Relay to that room's members
//! - `{...}` - Relay to the other members of the current room
//!
//! ## Events (server → client)
//!
//! Relayed frames are delivered exactly as the sender wrote them. The relay
//! sends nothing of its own: no acknowledgments and no error frames.
//!
//! # Example
//!
//! ```bash
//! # Start the server
//! signal-relay --port 3536
//!
//! # Two clients in the same room
//! websocat ws://127.0.0.1:3536/ws   # {"join":"my_room"}
//! websocat ws://127.0.0.1:3536/ws   # {"join":"my_room"}
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod state;
pub mod ws;

pub use config::Config;
pub use error::{ClientRequestError, SignalingError};
pub use handler::{Dispatch, RelayHandler, SignalHandler};
pub use protocol::Envelope;
pub use server::{AppState, build_router, serve};
pub use state::{Connection, ConnectionHandle, ConnectionId, RoomId, RoomRegistry};
