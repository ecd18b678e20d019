//! Wire envelope for client messages
//!
//! Every text frame is a flat JSON object. Three keys are recognized:
//!
//! - `join`: room to join; the frame is control-only and not relayed
//! - `leave`: `true` to leave the current room; control-only
//! - `roomId`: destination room for a relayed frame
//!
//! All other keys are opaque and reach recipients exactly as sent.

use crate::error::ClientRequestError;
use crate::state::RoomId;
use serde_json::{Map, Value};
use std::str::FromStr;

const JOIN: &str = "join";
const LEAVE: &str = "leave";
const ROOM_ID: &str = "roomId";

/// What a client frame asks the relay to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Join a room
    Join(RoomId),
    /// Leave the current room
    Leave,
    /// Relay the frame, optionally to an explicit room
    Relay { room_id: Option<RoomId> },
}

impl FromStr for Envelope {
    type Err = ClientRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        let Value::Object(fields) = value else {
            return Err(ClientRequestError::NotAnObject);
        };

        if let Some(room) = room_field(&fields, JOIN)? {
            return Ok(Envelope::Join(room));
        }

        match fields.get(LEAVE) {
            Some(Value::Bool(true)) => return Ok(Envelope::Leave),
            Some(Value::Bool(false)) | None => {}
            Some(_) => return Err(ClientRequestError::InvalidField(LEAVE)),
        }

        Ok(Envelope::Relay {
            room_id: room_field(&fields, ROOM_ID)?,
        })
    }
}

fn room_field(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<RoomId>, ClientRequestError> {
    match fields.get(key) {
        None => Ok(None),
        Some(Value::String(room)) if room.is_empty() => Err(ClientRequestError::EmptyRoomId(key)),
        Some(Value::String(room)) => Ok(Some(RoomId(room.clone()))),
        Some(_) => Err(ClientRequestError::InvalidField(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Envelope, ClientRequestError> {
        s.parse()
    }

    #[test]
    fn join_directive() {
        assert_eq!(
            parse(r#"{"join":"room1"}"#).unwrap(),
            Envelope::Join("room1".into())
        );
    }

    #[test]
    fn join_wins_over_room_id() {
        assert_eq!(
            parse(r#"{"roomId":"room2","join":"room1","sdp":{}}"#).unwrap(),
            Envelope::Join("room1".into())
        );
    }

    #[test]
    fn plain_payload_relays_to_current_room() {
        assert_eq!(
            parse(r#"{"candidate":{"candidate":"a=1","sdpMid":"0"}}"#).unwrap(),
            Envelope::Relay { room_id: None }
        );
        assert_eq!(parse("{}").unwrap(), Envelope::Relay { room_id: None });
    }

    #[test]
    fn room_id_overrides_destination() {
        assert_eq!(
            parse(r#"{"roomId":"Room1","text":"hello"}"#).unwrap(),
            Envelope::Relay {
                room_id: Some("Room1".into())
            }
        );
    }

    #[test]
    fn leave_directive() {
        assert_eq!(parse(r#"{"leave":true}"#).unwrap(), Envelope::Leave);
        assert_eq!(
            parse(r#"{"leave":false,"text":"x"}"#).unwrap(),
            Envelope::Relay { room_id: None }
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(parse("not json"), Err(ClientRequestError::Json(_))));
        assert!(matches!(parse(r#"{"join":"#), Err(ClientRequestError::Json(_))));
        assert!(matches!(parse(r#"["room1"]"#), Err(ClientRequestError::NotAnObject)));
        assert!(matches!(parse(r#""hello""#), Err(ClientRequestError::NotAnObject)));
        assert!(matches!(
            parse(r#"{"join":42}"#),
            Err(ClientRequestError::InvalidField("join"))
        ));
        assert!(matches!(
            parse(r#"{"roomId":null}"#),
            Err(ClientRequestError::InvalidField("roomId"))
        ));
        assert!(matches!(
            parse(r#"{"leave":"yes"}"#),
            Err(ClientRequestError::InvalidField("leave"))
        ));
    }

    #[test]
    fn empty_room_ids_are_rejected() {
        assert!(matches!(
            parse(r#"{"join":""}"#),
            Err(ClientRequestError::EmptyRoomId("join"))
        ));
        assert!(matches!(
            parse(r#"{"roomId":"","text":"x"}"#),
            Err(ClientRequestError::EmptyRoomId("roomId"))
        ));
    }
}
