//! InMemory Note Repository 実装
//!
//! ドメイン層が定義する NoteRepository trait の具体的な実装。

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use notecollab_shared::time::Clock;

use crate::domain::{Note, NoteRepository, RepositoryError, Version};

/// インメモリ Note Repository 実装
pub struct InMemoryNoteRepository {
    notes: RwLock<HashMap<String, Note>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryNoteRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Seed or overwrite a note.
    pub fn insert(&self, note: Note) {
        self.notes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(note.id.clone(), note);
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn get_note(&self, id: &str) -> Result<Note, RepositoryError> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NoteNotFound(id.to_string()))
    }

    async fn save_if_version(
        &self,
        id: &str,
        content: String,
        expected: Version,
    ) -> Result<Note, RepositoryError> {
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        let note = notes
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NoteNotFound(id.to_string()))?;

        if note.version != expected.value() {
            return Err(RepositoryError::StaleWrite {
                id: id.to_string(),
                stored: Version::new(note.version),
            });
        }

        note.content = content;
        note.version += 1;
        note.updated_at = self.clock.now_millis();
        Ok(note.clone())
    }
}
