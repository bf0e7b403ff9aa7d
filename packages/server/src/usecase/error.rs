//! UseCase 層のエラー型

use thiserror::Error;

use crate::{
    domain::{DocumentError, IdentityError, MessagePushError, RegistryError},
    infrastructure::dto::websocket::ProtocolError,
};

/// Errors local to one connection's session. None of them affects other connections.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection never became active.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Failed to decode message: {0}")]
    Decode(#[source] ProtocolError),

    #[error("Failed to serialize message: {0}")]
    Serialization(#[source] ProtocolError),

    #[error(transparent)]
    Transport(#[from] MessagePushError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// 接続処理のエラー
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Connection capacity exceeded (max: {max})")]
    CapacityExceeded { max: usize },

    #[error(transparent)]
    Handshake(SessionError),
}
