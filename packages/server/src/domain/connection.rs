//! Outbound side of a live transport connection.
//!
//! The transport task owns the socket; everyone else talks to it through a
//! `Connection`, which is a cheap handle around the channel feeding that task.

use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Instruction for the task that owns the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write one text frame.
    Text(String),
    /// Send a close frame and stop.
    Close,
}

/// Channel that feeds a connection's pusher task
pub type PusherChannel = mpsc::UnboundedSender<Outbound>;

/// Handle to one live connection. Equality is connection identity.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    channel: PusherChannel,
}

impl Connection {
    pub fn new(channel: PusherChannel) -> Self {
        Self {
            id: ConnectionId::generate(),
            channel,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame. Fails only if the transport side is gone.
    pub fn push(&self, content: &str) -> Result<(), MessagePushError> {
        self.channel
            .send(Outbound::Text(content.to_string()))
            .map_err(|_| MessagePushError::ConnectionClosed(self.id))
    }

    /// Ask the transport side to close. No-op if it is already gone.
    pub fn close(&self) {
        let _ = self.channel.send(Outbound::Close);
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}
