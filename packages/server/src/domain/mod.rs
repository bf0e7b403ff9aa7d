//! Domain layer: entities, value objects and the collaborator traits the
//! collaboration use cases depend on.

pub mod connection;
pub mod document;
pub mod entity;
pub mod error;
pub mod identity;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use connection::{Connection, Outbound, PusherChannel};
pub use document::DocumentSource;
pub use entity::{Client, Note, Participant, SharedDocument};
pub use error::{
    DocumentError, IdentityError, MessagePushError, RegistryError, RepositoryError,
    ValueObjectError,
};
pub use identity::IdentityResolver;
pub use pusher::MessagePusher;
pub use registry::ClientRegistry;
pub use repository::NoteRepository;
pub use value_object::{
    COLOR_PALETTE, Color, ConnectionId, Cursor, DocumentId, ParticipantId, Timestamp, Version,
};

#[cfg(test)]
pub use document::MockDocumentSource;
#[cfg(test)]
pub use identity::MockIdentityResolver;
