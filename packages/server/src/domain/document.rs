//! Source of truth for the shared document.

use async_trait::async_trait;

use super::{
    entity::SharedDocument,
    error::DocumentError,
    value_object::{DocumentId, Version},
};

/// Versioned document storage with optimistic concurrency.
///
/// Both the in-memory store and the note-backed store implement this; the
/// collaboration session never knows which one it talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Current snapshot of the document.
    async fn get(&self, id: &DocumentId) -> Result<SharedDocument, DocumentError>;

    /// Replace the content if `expected` equals the stored version.
    ///
    /// On success the version has advanced by exactly one and the new snapshot
    /// is returned. On mismatch nothing is written and
    /// `DocumentError::VersionConflict` is returned.
    async fn update(
        &self,
        id: &DocumentId,
        content: String,
        expected: Version,
    ) -> Result<SharedDocument, DocumentError>;
}
