//! Ephemeral, process-local shared document.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use notecollab_shared::time::{Clock, SystemClock};

use crate::domain::{DocumentError, DocumentId, DocumentSource, SharedDocument, Timestamp, Version};

/// Holds one document and serializes writes to it.
///
/// The version check and the write happen under the same exclusive guard, so
/// of two racing updates based on the same version exactly one succeeds.
pub struct SharedDocumentStore {
    document: RwLock<SharedDocument>,
    clock: Arc<dyn Clock>,
}

impl SharedDocumentStore {
    /// Empty document at version 0.
    pub fn new(id: DocumentId) -> Self {
        Self::with_content(id, String::new(), Arc::new(SystemClock))
    }

    pub fn with_content(id: DocumentId, content: String, clock: Arc<dyn Clock>) -> Self {
        let now = Timestamp::new(clock.now_millis());
        Self {
            document: RwLock::new(SharedDocument {
                id,
                content,
                version: Version::default(),
                updated_at: now,
            }),
            clock,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SharedDocument {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current content and version.
    pub fn get(&self) -> (String, Version) {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        (document.content.clone(), document.version)
    }

    /// Compare-and-increment write.
    pub fn update(
        &self,
        content: String,
        expected: Version,
    ) -> Result<SharedDocument, DocumentError> {
        let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
        if document.version != expected {
            return Err(DocumentError::VersionConflict {
                expected,
                actual: document.version,
            });
        }
        document.content = content;
        document.version = document.version.next();
        document.updated_at = Timestamp::new(self.clock.now_millis());
        Ok(document.clone())
    }

    fn check_id(&self, id: &DocumentId) -> Result<(), DocumentError> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        if &document.id != id {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentSource for SharedDocumentStore {
    async fn get(&self, id: &DocumentId) -> Result<SharedDocument, DocumentError> {
        self.check_id(id)?;
        Ok(self.snapshot())
    }

    async fn update(
        &self,
        id: &DocumentId,
        content: String,
        expected: Version,
    ) -> Result<SharedDocument, DocumentError> {
        self.check_id(id)?;
        SharedDocumentStore::update(self, content, expected)
    }
}
