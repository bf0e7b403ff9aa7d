//! Shared document backed by a persisted note.
//!
//! Version checks are delegated to the repository's compare-and-save, so the
//! conflict contract matches the in-memory store exactly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    DocumentError, DocumentId, DocumentSource, NoteRepository, RepositoryError, SharedDocument,
    Version,
};

pub struct NoteDocumentSource {
    repository: Arc<dyn NoteRepository>,
}

impl NoteDocumentSource {
    pub fn new(repository: Arc<dyn NoteRepository>) -> Self {
        Self { repository }
    }
}

fn to_document_error(error: RepositoryError) -> DocumentError {
    match error {
        RepositoryError::NoteNotFound(id) => DocumentError::NotFound(id),
        RepositoryError::StaleWrite { id, .. } => {
            DocumentError::Storage(format!("note '{}' changed during save", id))
        }
    }
}

#[async_trait]
impl DocumentSource for NoteDocumentSource {
    async fn get(&self, id: &DocumentId) -> Result<SharedDocument, DocumentError> {
        let note = self
            .repository
            .get_note(id.as_str())
            .await
            .map_err(to_document_error)?;
        Ok(note.to_document(id.clone()))
    }

    async fn update(
        &self,
        id: &DocumentId,
        content: String,
        expected: Version,
    ) -> Result<SharedDocument, DocumentError> {
        match self
            .repository
            .save_if_version(id.as_str(), content, expected)
            .await
        {
            Ok(note) => Ok(note.to_document(id.clone())),
            Err(RepositoryError::StaleWrite { stored, .. }) => Err(DocumentError::VersionConflict {
                expected,
                actual: stored,
            }),
            Err(e) => Err(to_document_error(e)),
        }
    }
}
