//! Registry of live connections.

use super::{
    entity::{Client, Participant},
    error::RegistryError,
    value_object::{ConnectionId, ParticipantId},
};

/// Bookkeeping of every live client binding, keyed by connection identity.
///
/// Implementations are synchronous and must never hold their lock while a
/// caller iterates: `get_all` hands out a copy.
pub trait ClientRegistry: Send + Sync {
    /// Insert or overwrite the binding for `client.connection`.
    fn add(&self, client: Client);

    /// Drop the binding, returning it if it was present.
    fn remove(&self, connection_id: &ConnectionId) -> Option<Client>;

    fn get(&self, connection_id: &ConnectionId) -> Result<Client, RegistryError>;

    /// Snapshot of all bindings.
    fn get_all(&self) -> Vec<Client>;

    fn get_by_participant_id(&self, participant_id: &ParticipantId)
    -> Result<Client, RegistryError>;

    /// Replace the participant of an existing binding.
    fn update_participant(
        &self,
        connection_id: &ConnectionId,
        participant: Participant,
    ) -> Result<(), RegistryError>;

    fn count(&self) -> usize;
}
