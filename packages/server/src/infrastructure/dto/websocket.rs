//! Collaboration protocol over WebSocket text frames.
//!
//! Every frame is an envelope `{"type": "<kind>", "payload": {...}}`. The payload
//! is only interpreted once the kind is known, and kinds this server does not
//! understand are dropped without error so newer clients keep working.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every message kind of the protocol, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Init,
    Join,
    Cursor,
    DocUpdate,
    DocState,
    UserJoined,
    UserLeft,
    UserUpdated,
    Ping,
    Pong,
}

impl MessageType {
    pub const ALL: [MessageType; 10] = [
        MessageType::Init,
        MessageType::Join,
        MessageType::Cursor,
        MessageType::DocUpdate,
        MessageType::DocState,
        MessageType::UserJoined,
        MessageType::UserLeft,
        MessageType::UserUpdated,
        MessageType::Ping,
        MessageType::Pong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Init => "init",
            MessageType::Join => "join",
            MessageType::Cursor => "cursor",
            MessageType::DocUpdate => "doc_update",
            MessageType::DocState => "doc_state",
            MessageType::UserJoined => "user_joined",
            MessageType::UserLeft => "user_left",
            MessageType::UserUpdated => "user_updated",
            MessageType::Ping => "ping",
            MessageType::Pong => "pong",
        }
    }

    /// `None` for kinds outside the protocol.
    pub fn parse(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == kind)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol (de)serialization errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Malformed '{kind}' payload: {source}")]
    Payload {
        kind: MessageType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Raw envelope; `payload` stays opaque until the kind is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub r#type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Envelope)
    }

    fn payload_as<T: serde::de::DeserializeOwned>(
        self,
        kind: MessageType,
    ) -> Result<T, ProtocolError> {
        serde_json::from_value(self.payload)
            .map_err(|source| ProtocolError::Payload { kind, source })
    }

    /// Interpret the envelope as a client request.
    ///
    /// Returns `Ok(None)` for unknown kinds and for kinds only the server sends.
    pub fn into_client_message(self) -> Result<Option<ClientMessage>, ProtocolError> {
        let Some(kind) = MessageType::parse(&self.r#type) else {
            return Ok(None);
        };

        let message = match kind {
            MessageType::Join => ClientMessage::Join(self.payload_as(kind)?),
            MessageType::Cursor => ClientMessage::Cursor(self.payload_as(kind)?),
            MessageType::DocUpdate => ClientMessage::DocUpdate(self.payload_as(kind)?),
            MessageType::Ping => ClientMessage::Ping,
            MessageType::Init
            | MessageType::DocState
            | MessageType::UserJoined
            | MessageType::UserLeft
            | MessageType::UserUpdated
            | MessageType::Pong => return Ok(None),
        };

        Ok(Some(message))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorDto {
    pub index: usize,
    pub length: usize,
}

/// Participant as seen on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub cursor: CursorDto,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPayload {
    #[serde(rename = "self")]
    pub self_: ParticipantDto,
    pub users: Vec<ParticipantDto>,
    pub content: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorUpdatePayload {
    pub id: String,
    pub cursor: CursorDto,
}

/// Used both for `doc_update` requests and `doc_state` replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocPayload {
    pub content: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLeftPayload {
    pub id: String,
}

/// Messages a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Join(JoinPayload),
    Cursor(CursorDto),
    DocUpdate(DocPayload),
    Ping,
}

impl ClientMessage {
    /// Decode a text frame. `Ok(None)` means "not for us, ignore".
    pub fn decode(text: &str) -> Result<Option<Self>, ProtocolError> {
        Envelope::parse(text)?.into_client_message()
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    Init(InitPayload),
    UserJoined(ParticipantDto),
    UserUpdated(ParticipantDto),
    UserLeft(UserLeftPayload),
    Cursor(CursorUpdatePayload),
    DocState(DocPayload),
    Pong,
}

impl ServerMessage {
    pub fn kind(&self) -> MessageType {
        match self {
            ServerMessage::Init(_) => MessageType::Init,
            ServerMessage::UserJoined(_) => MessageType::UserJoined,
            ServerMessage::UserUpdated(_) => MessageType::UserUpdated,
            ServerMessage::UserLeft(_) => MessageType::UserLeft,
            ServerMessage::Cursor(_) => MessageType::Cursor,
            ServerMessage::DocState(_) => MessageType::DocState,
            ServerMessage::Pong => MessageType::Pong,
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Envelope)
    }
}
