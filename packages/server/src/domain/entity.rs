//! Domain entities.

use super::{
    connection::Connection,
    value_object::{Color, Cursor, DocumentId, ParticipantId, Timestamp, Version},
};

/// A connected user's identity and presence state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub color: Color,
    pub cursor: Cursor,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Participant {
    pub fn new(id: ParticipantId, name: String, color: Color, now: Timestamp) -> Self {
        Self {
            id,
            name,
            color,
            cursor: Cursor::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a join request. An empty name leaves the participant untouched.
    ///
    /// Returns `true` when the name changed.
    pub fn rename(&mut self, name: &str, now: Timestamp) -> bool {
        if name.is_empty() {
            return false;
        }
        self.name = name.to_string();
        self.updated_at = now;
        true
    }

    pub fn move_cursor(&mut self, cursor: Cursor, now: Timestamp) {
        self.cursor = cursor;
        self.updated_at = now;
    }
}

/// Snapshot of the shared document. Always a copy, never a live reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDocument {
    pub id: DocumentId,
    pub content: String,
    pub version: Version,
    pub updated_at: Timestamp,
}

/// A persisted note, as stored behind the note repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub version: i64,
    pub updated_at: i64,
}

impl Note {
    pub fn to_document(&self, id: DocumentId) -> SharedDocument {
        SharedDocument {
            id,
            content: self.content.clone(),
            version: Version::new(self.version),
            updated_at: Timestamp::new(self.updated_at),
        }
    }
}

/// Binding of one live connection to one participant.
///
/// Only ever constructed with both halves present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub connection: Connection,
    pub participant: Participant,
    pub document_id: Option<DocumentId>,
}

impl Client {
    pub fn new(
        connection: Connection,
        participant: Participant,
        document_id: Option<DocumentId>,
    ) -> Self {
        Self {
            connection,
            participant,
            document_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_participant() -> Participant {
        Participant::new(
            ParticipantId::new("u-1".to_string()).unwrap(),
            String::new(),
            Color::for_sequence(1),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_rename_with_name_updates_participant() {
        // テスト項目: 空でない名前で rename すると名前と更新時刻が変わる
        // given (前提条件):
        let mut participant = create_test_participant();

        // when (操作):
        let changed = participant.rename("alice", Timestamp::new(2000));

        // then (期待する結果):
        assert!(changed);
        assert_eq!(participant.name, "alice");
        assert_eq!(participant.updated_at, Timestamp::new(2000));
        assert_eq!(participant.created_at, Timestamp::new(1000));
    }

    #[test]
    fn test_rename_with_empty_name_is_noop() {
        // テスト項目: 空の名前での rename は何も変更しない
        // given (前提条件):
        let mut participant = create_test_participant();
        participant.rename("alice", Timestamp::new(2000));
        let before = participant.clone();

        // when (操作):
        let changed = participant.rename("", Timestamp::new(3000));

        // then (期待する結果):
        assert!(!changed);
        assert_eq!(participant, before);
    }

    #[test]
    fn test_note_to_document_keeps_version() {
        // テスト項目: Note から SharedDocument への変換でバージョンが保持される
        // given (前提条件):
        let note = Note {
            id: "n-1".to_string(),
            title: "Groceries".to_string(),
            content: "milk".to_string(),
            version: 12,
            updated_at: 5000,
        };

        // when (操作):
        let document = note.to_document(DocumentId::new("n-1".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(document.content, "milk");
        assert_eq!(document.version, Version::new(12));
        assert_eq!(document.updated_at, Timestamp::new(5000));
    }
}
