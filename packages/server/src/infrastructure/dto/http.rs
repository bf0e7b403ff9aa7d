//! HTTP API response DTOs.
//!
//! `GET /api/participants` answers with a plain array of
//! [`ParticipantDto`](super::websocket::ParticipantDto), the same shape the
//! WebSocket protocol uses.

use serde::{Deserialize, Serialize};

/// `GET /api/document`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDto {
    pub id: String,
    pub content: String,
    pub version: i64,
    /// RFC 3339
    pub updated_at: String,
}
