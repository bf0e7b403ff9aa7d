//! Encoding plus delivery of server messages, shared by the use cases.

use crate::{
    domain::{Connection, ConnectionId, MessagePusher},
    infrastructure::dto::websocket::ServerMessage,
};

use super::error::SessionError;

/// Encode once and queue for a single connection.
pub(crate) fn send_to(
    pusher: &dyn MessagePusher,
    connection: &Connection,
    message: &ServerMessage,
) -> Result<(), SessionError> {
    let json = message.encode().map_err(SessionError::Serialization)?;
    pusher.push_to(connection, &json)?;
    Ok(())
}

/// Encode once and fan out to every registered connection except `except`.
///
/// Returns the number of connections the message was queued for.
pub(crate) fn broadcast(
    pusher: &dyn MessagePusher,
    message: &ServerMessage,
    except: Option<ConnectionId>,
) -> Result<usize, SessionError> {
    let json = message.encode().map_err(SessionError::Serialization)?;
    let delivered = pusher.broadcast(&json, except);
    tracing::debug!("Broadcasted '{}' to {} connection(s)", message.kind(), delivered);
    Ok(delivered)
}
