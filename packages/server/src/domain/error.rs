//! Domain error types.

use thiserror::Error;

use super::value_object::{ConnectionId, Version};

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("{kind} must be at most {max} characters")]
    IdTooLong { kind: &'static str, max: usize },
}

/// Connection registry lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    #[error("No connection registered for participant '{0}'")]
    ParticipantNotFound(String),
}

/// Shared document errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The caller's version is stale (or ahead); nothing was written.
    #[error("Version conflict: document is at {actual}, update was based on {expected}")]
    VersionConflict { expected: Version, actual: Version },

    #[error("Document '{0}' not found")]
    NotFound(String),

    #[error("Document storage error: {0}")]
    Storage(String),
}

/// Participant identity errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Participant '{0}' not found")]
    NotFound(String),

    #[error("Identity storage error: {0}")]
    Storage(String),
}

/// Note repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error("Note '{id}' was modified concurrently (stored version {stored})")]
    StaleWrite { id: String, stored: Version },
}

/// Outbound message delivery errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' is closed")]
    ConnectionClosed(ConnectionId),
}
