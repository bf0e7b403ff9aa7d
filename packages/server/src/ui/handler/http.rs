//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    domain::DocumentError,
    infrastructure::dto::{http::DocumentDto, websocket::ParticipantDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Snapshot of the shared document
pub async fn get_document(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentDto>, StatusCode> {
    match state.session.document().await {
        // Domain Model から DTO への変換
        Ok(document) => Ok(Json(DocumentDto::from(&document))),
        Err(DocumentError::NotFound(id)) => {
            tracing::warn!("Document '{}' not found", id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!("Failed to load document: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Connected participants, sorted by id
pub async fn get_participants(State(state): State<Arc<AppState>>) -> Json<Vec<ParticipantDto>> {
    let participants = state
        .session
        .participants()
        .iter()
        .map(ParticipantDto::from)
        .collect();
    Json(participants)
}
