//! Domain Model ⇄ DTO 変換

use notecollab_shared::time::timestamp_to_rfc3339;

use super::{
    http::DocumentDto,
    websocket::{CursorDto, DocPayload, ParticipantDto},
};
use crate::domain::{Cursor, Participant, SharedDocument};

impl From<Cursor> for CursorDto {
    fn from(cursor: Cursor) -> Self {
        Self {
            index: cursor.index,
            length: cursor.length,
        }
    }
}

impl From<CursorDto> for Cursor {
    fn from(dto: CursorDto) -> Self {
        Cursor::new(dto.index, dto.length)
    }
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id.as_str().to_string(),
            name: participant.name.clone(),
            color: participant.color.as_str().to_string(),
            cursor: participant.cursor.into(),
            created_at: timestamp_to_rfc3339(participant.created_at.value()),
            updated_at: timestamp_to_rfc3339(participant.updated_at.value()),
        }
    }
}

impl From<&SharedDocument> for DocPayload {
    fn from(document: &SharedDocument) -> Self {
        Self {
            content: document.content.clone(),
            version: document.version.value(),
        }
    }
}

impl From<&SharedDocument> for DocumentDto {
    fn from(document: &SharedDocument) -> Self {
        Self {
            id: document.id.as_str().to_string(),
            content: document.content.clone(),
            version: document.version.value(),
            updated_at: timestamp_to_rfc3339(document.updated_at.value()),
        }
    }
}
