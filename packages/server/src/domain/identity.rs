//! Participant identity collaborator.

use async_trait::async_trait;

use super::{
    entity::Participant,
    error::IdentityError,
    value_object::{Cursor, ParticipantId},
};

/// Looks up, mints and updates participants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn get_by_id(&self, id: &ParticipantId) -> Result<Participant, IdentityError>;

    /// Mint a new participant with the next palette color.
    async fn create(&self, name: String) -> Result<Participant, IdentityError>;

    async fn update(&self, participant: &Participant) -> Result<(), IdentityError>;

    /// Store the participant's cursor. Account-backed resolvers keep cursors
    /// ephemeral and leave this as a no-op.
    async fn record_cursor(
        &self,
        _id: &ParticipantId,
        _cursor: Cursor,
    ) -> Result<(), IdentityError> {
        Ok(())
    }
}
