//! Outbound delivery abstraction.

use super::{connection::Connection, error::MessagePushError, value_object::ConnectionId};

/// Delivers encoded messages to live connections.
pub trait MessagePusher: Send + Sync {
    /// Send to a single connection.
    fn push_to(&self, connection: &Connection, content: &str) -> Result<(), MessagePushError>;

    /// Send to every registered connection except `except` (`None` sends to all).
    ///
    /// Best effort: a failed connection is closed and evicted, the rest still
    /// receive the message. Returns how many connections were reached.
    fn broadcast(&self, content: &str, except: Option<ConnectionId>) -> usize;
}
