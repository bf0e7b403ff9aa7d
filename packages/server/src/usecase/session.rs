//! Collaboration session: the entry points the gateway drives for each connection.
//!
//! Connection lifecycle:
//!
//! ```text
//! Connecting --on_connect--> Active --read error / close--> Closing --on_disconnect--> Closed
//! ```
//!
//! The registry and the document source are locked independently and no
//! operation here holds one while touching the other.

use std::sync::Arc;

use notecollab_shared::time::Clock;

use crate::{
    domain::{
        Client, ClientRegistry, Connection, ConnectionId, DocumentError, DocumentId,
        DocumentSource, IdentityResolver, MessagePusher, Participant, ParticipantId,
        PusherChannel, SharedDocument,
    },
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
};

use super::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, DispatchMessageUseCase,
    error::{ConnectError, SessionError},
    outbound,
};

/// Collaborators a session is built from.
pub struct SessionDeps {
    pub registry: Arc<dyn ClientRegistry>,
    pub identity: Arc<dyn IdentityResolver>,
    pub documents: Arc<dyn DocumentSource>,
    pub message_pusher: Arc<dyn MessagePusher>,
    pub clock: Arc<dyn Clock>,
}

/// One shared document and everyone connected to it.
pub struct CollaborationSession {
    document_id: DocumentId,
    max_connections: usize,
    registry: Arc<dyn ClientRegistry>,
    documents: Arc<dyn DocumentSource>,
    message_pusher: Arc<dyn MessagePusher>,
    connect_participant_usecase: ConnectParticipantUseCase,
    dispatch_message_usecase: DispatchMessageUseCase,
    disconnect_participant_usecase: DisconnectParticipantUseCase,
}

impl CollaborationSession {
    pub fn new(document_id: DocumentId, max_connections: usize, deps: SessionDeps) -> Self {
        let SessionDeps {
            registry,
            identity,
            documents,
            message_pusher,
            clock,
        } = deps;

        Self {
            connect_participant_usecase: ConnectParticipantUseCase::new(
                registry.clone(),
                documents.clone(),
                message_pusher.clone(),
                max_connections,
            ),
            dispatch_message_usecase: DispatchMessageUseCase::new(
                registry.clone(),
                identity,
                documents.clone(),
                message_pusher.clone(),
                document_id.clone(),
                clock,
            ),
            disconnect_participant_usecase: DisconnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            ),
            document_id,
            max_connections,
            registry,
            documents,
            message_pusher,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// Cheap pre-check before accepting an upgrade; `on_connect` enforces the cap.
    pub fn is_full(&self) -> bool {
        self.registry.count() >= self.max_connections
    }

    /// Register a new connection and complete its handshake.
    pub async fn on_connect(
        &self,
        participant: Participant,
        channel: PusherChannel,
    ) -> Result<Connection, ConnectError> {
        self.connect_participant_usecase
            .execute(participant, self.document_id.clone(), channel)
            .await
    }

    /// Decode one text frame and dispatch it.
    ///
    /// Kinds outside the client protocol are ignored.
    pub async fn handle_text(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Result<(), SessionError> {
        match ClientMessage::decode(text).map_err(SessionError::Decode)? {
            Some(message) => self.dispatch(connection_id, message).await,
            None => {
                tracing::debug!("Ignoring unhandled message kind from '{}'", connection_id);
                Ok(())
            }
        }
    }

    pub async fn dispatch(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        self.dispatch_message_usecase
            .execute(connection_id, message)
            .await
    }

    /// Send to every connection except `except` (`None` means everyone).
    pub fn broadcast(
        &self,
        message: &ServerMessage,
        except: Option<ConnectionId>,
    ) -> Result<usize, SessionError> {
        outbound::broadcast(self.message_pusher.as_ref(), message, except)
    }

    pub fn remove_client(&self, connection_id: &ConnectionId) -> Option<Client> {
        self.registry.remove(connection_id)
    }

    /// Remove the binding and tell the remaining connections.
    pub fn on_disconnect(
        &self,
        connection_id: &ConnectionId,
        participant_id: &ParticipantId,
    ) -> Option<Client> {
        self.disconnect_participant_usecase
            .execute(connection_id, participant_id)
    }

    /// Ask every registered connection to close; each one then unwinds through
    /// its normal cleanup.
    pub fn close_all(&self) -> usize {
        let clients = self.registry.get_all();
        for client in &clients {
            client.connection.close();
        }
        tracing::info!("Requested close for {} connection(s)", clients.len());
        clients.len()
    }

    /// Connected participants, sorted by id.
    pub fn participants(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self
            .registry
            .get_all()
            .into_iter()
            .map(|client| client.participant)
            .collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));
        participants
    }

    pub async fn document(&self) -> Result<SharedDocument, DocumentError> {
        self.documents.get(&self.document_id).await
    }
}

#[cfg(test)]
mod tests {
    use notecollab_shared::time::FixedClock;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::{
        domain::Outbound,
        infrastructure::{
            document::SharedDocumentStore, dto::websocket::ProtocolError,
            message_pusher::WebSocketMessagePusher, registry::InMemoryClientRegistry,
            repository::InMemoryParticipantRepository,
        },
    };

    fn create_test_session(
        max_connections: usize,
    ) -> (CollaborationSession, Arc<InMemoryParticipantRepository>) {
        let clock = Arc::new(FixedClock::new(0));
        let document_id = DocumentId::new("default".to_string()).unwrap();
        let registry = Arc::new(InMemoryClientRegistry::new());
        let identity = Arc::new(InMemoryParticipantRepository::new(clock.clone()));
        let session = CollaborationSession::new(
            document_id.clone(),
            max_connections,
            SessionDeps {
                registry: registry.clone(),
                identity: identity.clone(),
                documents: Arc::new(SharedDocumentStore::with_content(
                    document_id,
                    "hello".to_string(),
                    clock.clone(),
                )),
                message_pusher: Arc::new(WebSocketMessagePusher::new(registry)),
                clock,
            },
        );
        (session, identity)
    }

    async fn join(
        session: &CollaborationSession,
        identity: &InMemoryParticipantRepository,
    ) -> (Connection, UnboundedReceiver<Outbound>) {
        let participant = identity.create(String::new()).await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = session.on_connect(participant, tx).await.unwrap();
        // init
        assert!(matches!(rx.try_recv(), Ok(Outbound::Text(_))));
        (connection, rx)
    }

    #[tokio::test]
    async fn test_handle_text_ignores_unknown_kind() {
        // テスト項目: 未知の種別のメッセージは無視され、何も配信されない
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (alice, mut rx_alice) = join(&session, &identity).await;
        let (_bob, mut rx_bob) = join(&session, &identity).await;
        rx_alice.try_recv().ok(); // bob's user_joined

        // when (操作):
        let result = session
            .handle_text(alice.id(), r#"{"type":"selection","payload":{"from":1}}"#)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx_alice.try_recv().is_err());
        assert!(rx_bob.try_recv().is_err());
        assert_eq!(session.document().await.unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_handle_text_malformed_payload_is_decode_error() {
        // テスト項目: 既知の種別の不正な payload はデコードエラーになり、状態は変わらない
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (alice, _rx_alice) = join(&session, &identity).await;

        // when (操作):
        let result = session
            .handle_text(alice.id(), r#"{"type":"doc_update","payload":{"content":1}}"#)
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(SessionError::Decode(ProtocolError::Payload { .. }))
        ));
        assert_eq!(session.document().await.unwrap().version.value(), 0);
        assert_eq!(session.participants().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_text_dispatches_known_kind() {
        // テスト項目: 既知の種別はデコードされて処理される
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (alice, mut rx_alice) = join(&session, &identity).await;

        // when (操作):
        session
            .handle_text(alice.id(), r#"{"type":"ping"}"#)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            rx_alice.try_recv().ok(),
            Some(Outbound::Text(r#"{"type":"pong"}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn test_close_all_requests_close_for_every_connection() {
        // テスト項目: close_all で全ての接続にクローズ指示が送られる
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (_alice, mut rx_alice) = join(&session, &identity).await;
        let (_bob, mut rx_bob) = join(&session, &identity).await;
        rx_alice.try_recv().ok(); // bob's user_joined

        // when (操作):
        let closed = session.close_all();

        // then (期待する結果):
        assert_eq!(closed, 2);
        assert_eq!(rx_alice.try_recv().ok(), Some(Outbound::Close));
        assert_eq!(rx_bob.try_recv().ok(), Some(Outbound::Close));
    }

    #[tokio::test]
    async fn test_participants_sorted_and_updated_on_disconnect() {
        // テスト項目: 参加者一覧は ID 順で、切断すると一覧から外れる
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (_alice, _rx_alice) = join(&session, &identity).await;
        let (bob, _rx_bob) = join(&session, &identity).await;
        let bob_id = session.participants()[1].id.clone();

        // when (操作):
        session.on_disconnect(&bob.id(), &bob_id);

        // then (期待する結果):
        let ids: Vec<String> = session
            .participants()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["u-1"]);
    }

    #[tokio::test]
    async fn test_is_full_at_capacity() {
        // テスト項目: 接続数が上限に達すると is_full が true になる
        // given (前提条件):
        let (session, identity) = create_test_session(2);
        let (_alice, _rx_alice) = join(&session, &identity).await;
        assert!(!session.is_full());

        // when (操作):
        let (_bob, _rx_bob) = join(&session, &identity).await;

        // then (期待する結果):
        assert!(session.is_full());
    }

    #[tokio::test]
    async fn test_broadcast_and_remove_client() {
        // テスト項目: remove_client した接続にはブロードキャストが届かない
        // given (前提条件):
        let (session, identity) = create_test_session(25);
        let (alice, mut rx_alice) = join(&session, &identity).await;
        let (_bob, mut rx_bob) = join(&session, &identity).await;
        rx_alice.try_recv().ok(); // bob's user_joined
        session.remove_client(&alice.id());

        // when (操作):
        let delivered = session.broadcast(&ServerMessage::Pong, None).unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert!(rx_alice.try_recv().is_err());
        assert!(rx_bob.try_recv().is_ok());
    }
}
