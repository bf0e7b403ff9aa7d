//! Wiring of the collaboration server from a [`ServerConfig`].
//!
//! Dependencies are created in order:
//! 1. Registry
//! 2. Identity and document stores (per backing)
//! 3. MessagePusher
//! 4. UseCases
//! 5. Server

use std::sync::Arc;

use notecollab_shared::time::Clock;

use crate::{
    config::{ConfigError, DocumentBacking, ServerConfig},
    domain::{DocumentId, DocumentSource, IdentityResolver, Note},
    infrastructure::{
        document::{NoteDocumentSource, SharedDocumentStore},
        message_pusher::WebSocketMessagePusher,
        registry::InMemoryClientRegistry,
        repository::{InMemoryNoteRepository, InMemoryParticipantRepository},
    },
    ui::Server,
    usecase::{CollaborationSession, ResolveParticipantUseCase, SessionDeps},
};

pub fn build_server(config: &ServerConfig, clock: Arc<dyn Clock>) -> Result<Server, ConfigError> {
    config.validate()?;
    let document_id = DocumentId::new(config.document_id.clone())?;

    // 1. Registry
    let registry = Arc::new(InMemoryClientRegistry::new());

    // 2. Identity and document stores
    let (identity, documents): (Arc<dyn IdentityResolver>, Arc<dyn DocumentSource>) =
        match config.backing {
            DocumentBacking::Memory => {
                let store = SharedDocumentStore::with_content(
                    document_id.clone(),
                    config.initial_content.clone(),
                    clock.clone(),
                );
                let identity: Arc<dyn IdentityResolver> =
                    Arc::new(InMemoryParticipantRepository::new(clock.clone()));
                let documents: Arc<dyn DocumentSource> = Arc::new(store);
                (identity, documents)
            }
            DocumentBacking::Note => {
                let notes = Arc::new(InMemoryNoteRepository::new(clock.clone()));
                notes.insert(Note {
                    id: document_id.as_str().to_string(),
                    title: document_id.as_str().to_string(),
                    content: config.initial_content.clone(),
                    version: 0,
                    updated_at: clock.now_millis(),
                });
                let identity: Arc<dyn IdentityResolver> = Arc::new(
                    InMemoryParticipantRepository::without_cursor_tracking(clock.clone()),
                );
                let documents: Arc<dyn DocumentSource> = Arc::new(NoteDocumentSource::new(notes));
                (identity, documents)
            }
        };
    tracing::info!(
        "Document '{}' ready ({} backing)",
        document_id,
        config.backing
    );

    // 3. MessagePusher
    let message_pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));

    // 4. UseCases
    let resolve_participant_usecase = Arc::new(ResolveParticipantUseCase::new(identity.clone()));
    let session = Arc::new(CollaborationSession::new(
        document_id,
        config.max_connections,
        SessionDeps {
            registry,
            identity,
            documents,
            message_pusher,
            clock,
        },
    ));

    // 5. Server
    Ok(Server::new(resolve_participant_usecase, session))
}
