//! UseCase: クライアントメッセージの処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DispatchMessageUseCase::execute() メソッド
//! - join / cursor / doc_update / ping の各メッセージの処理と配信先
//!
//! ### なぜこのテストが必要か
//! - 送信者を除外するブロードキャストと送信者のみへの返信が正しく使い分けられることを保証
//! - 古いバージョンに基づく更新が拒否され、送信者だけに訂正が届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：各メッセージ種別の処理
//! - 異常系：バージョン競合、参加者情報の更新失敗
//! - エッジケース：空の名前での join

use std::sync::Arc;

use notecollab_shared::time::Clock;

use crate::{
    domain::{
        Client, ClientRegistry, ConnectionId, Cursor, DocumentError, DocumentId, DocumentSource,
        IdentityResolver, MessagePusher, Timestamp, Version,
    },
    infrastructure::dto::websocket::{
        ClientMessage, CursorUpdatePayload, DocPayload, ParticipantDto, ServerMessage,
    },
};

use super::{error::SessionError, outbound};

/// クライアントメッセージ処理のユースケース
pub struct DispatchMessageUseCase {
    /// ClientRegistry（接続中のクライアントの管理）
    registry: Arc<dyn ClientRegistry>,
    /// IdentityResolver（参加者情報の永続化の抽象化）
    identity: Arc<dyn IdentityResolver>,
    /// DocumentSource（共有ドキュメントの抽象化）
    documents: Arc<dyn DocumentSource>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Used when a binding carries no target document of its own.
    default_document_id: DocumentId,
    clock: Arc<dyn Clock>,
}

impl DispatchMessageUseCase {
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        identity: Arc<dyn IdentityResolver>,
        documents: Arc<dyn DocumentSource>,
        message_pusher: Arc<dyn MessagePusher>,
        default_document_id: DocumentId,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            identity,
            documents,
            message_pusher,
            default_document_id,
            clock,
        }
    }

    /// Handle one decoded message from `connection_id`.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        let client = self.registry.get(&connection_id)?;

        match message {
            ClientMessage::Join(payload) => self.join(client, &payload.name).await,
            ClientMessage::Cursor(cursor) => self.move_cursor(client, cursor.into()).await,
            ClientMessage::DocUpdate(payload) => self.update_document(client, payload).await,
            ClientMessage::Ping => outbound::send_to(
                self.message_pusher.as_ref(),
                &client.connection,
                &ServerMessage::Pong,
            ),
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// An empty name changes nothing but the participant is still rebroadcast.
    async fn join(&self, client: Client, name: &str) -> Result<(), SessionError> {
        let connection_id = client.connection.id();
        let mut participant = client.participant;

        if participant.rename(name, self.now()) {
            self.identity.update(&participant).await?;
            self.registry
                .update_participant(&connection_id, participant.clone())?;
            tracing::info!("Participant '{}' is now '{}'", participant.id, participant.name);
        }

        let updated = ServerMessage::UserUpdated(ParticipantDto::from(&participant));
        outbound::broadcast(self.message_pusher.as_ref(), &updated, Some(connection_id))?;
        Ok(())
    }

    async fn move_cursor(&self, client: Client, cursor: Cursor) -> Result<(), SessionError> {
        let connection_id = client.connection.id();
        let mut participant = client.participant;

        participant.move_cursor(cursor, self.now());
        self.identity.record_cursor(&participant.id, cursor).await?;
        self.registry
            .update_participant(&connection_id, participant.clone())?;

        let moved = ServerMessage::Cursor(CursorUpdatePayload {
            id: participant.id.to_string(),
            cursor: cursor.into(),
        });
        outbound::broadcast(self.message_pusher.as_ref(), &moved, Some(connection_id))?;
        Ok(())
    }

    /// Successful writes go to everyone, the sender included. A conflict is
    /// answered with the current state, to the sender only.
    async fn update_document(
        &self,
        client: Client,
        payload: DocPayload,
    ) -> Result<(), SessionError> {
        let document_id = client
            .document_id
            .as_ref()
            .unwrap_or(&self.default_document_id);

        match self
            .documents
            .update(document_id, payload.content, Version::new(payload.version))
            .await
        {
            Ok(document) => {
                tracing::info!(
                    "Document '{}' updated to version {} by '{}'",
                    document.id,
                    document.version,
                    client.participant.id
                );
                let state = ServerMessage::DocState(DocPayload::from(&document));
                outbound::broadcast(self.message_pusher.as_ref(), &state, None)?;
                Ok(())
            }
            Err(DocumentError::VersionConflict { expected, actual }) => {
                tracing::warn!(
                    "Rejected update from '{}': based on version {}, document is at {}",
                    client.participant.id,
                    expected,
                    actual
                );
                let current = self.documents.get(document_id).await?;
                let state = ServerMessage::DocState(DocPayload::from(&current));
                outbound::send_to(self.message_pusher.as_ref(), &client.connection, &state)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use notecollab_shared::time::FixedClock;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::{
        domain::{
            Color, Connection, IdentityError, MockIdentityResolver, Outbound, Participant,
            ParticipantId,
        },
        infrastructure::{
            document::SharedDocumentStore,
            dto::websocket::{CursorDto, JoinPayload},
            message_pusher::WebSocketMessagePusher,
            registry::InMemoryClientRegistry,
            repository::InMemoryParticipantRepository,
        },
    };

    struct Fixture {
        usecase: DispatchMessageUseCase,
        registry: Arc<InMemoryClientRegistry>,
        identity: Arc<dyn IdentityResolver>,
        store: Arc<SharedDocumentStore>,
    }

    fn document_id() -> DocumentId {
        DocumentId::new("default".to_string()).unwrap()
    }

    fn create_fixture(identity: Arc<dyn IdentityResolver>) -> Fixture {
        let clock = Arc::new(FixedClock::new(1_000));
        let registry = Arc::new(InMemoryClientRegistry::new());
        let store = Arc::new(SharedDocumentStore::with_content(
            document_id(),
            String::new(),
            clock.clone(),
        ));
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let usecase = DispatchMessageUseCase::new(
            registry.clone(),
            identity.clone(),
            store.clone(),
            pusher,
            document_id(),
            clock,
        );
        Fixture {
            usecase,
            registry,
            identity,
            store,
        }
    }

    fn in_memory_fixture() -> Fixture {
        create_fixture(Arc::new(InMemoryParticipantRepository::new(Arc::new(
            FixedClock::new(0),
        ))))
    }

    async fn connect(fixture: &Fixture) -> (Connection, UnboundedReceiver<Outbound>) {
        let participant = fixture.identity.create(String::new()).await.unwrap();
        register(fixture, participant)
    }

    fn register(
        fixture: &Fixture,
        participant: Participant,
    ) -> (Connection, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Connection::new(tx);
        fixture.registry.add(Client::new(
            connection.clone(),
            participant,
            Some(document_id()),
        ));
        (connection, rx)
    }

    fn participant(seq: u64, name: &str) -> Participant {
        Participant::new(
            ParticipantId::ephemeral(seq),
            name.to_string(),
            Color::for_sequence(seq),
            Timestamp::new(0),
        )
    }

    fn recv_message(rx: &mut UnboundedReceiver<Outbound>) -> ServerMessage {
        match rx.try_recv() {
            Ok(Outbound::Text(text)) => ServerMessage::decode(&text).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    fn join(name: &str) -> ClientMessage {
        ClientMessage::Join(JoinPayload {
            name: name.to_string(),
        })
    }

    fn doc_update(content: &str, version: i64) -> ClientMessage {
        ClientMessage::DocUpdate(DocPayload {
            content: content.to_string(),
            version,
        })
    }

    #[tokio::test]
    async fn test_join_renames_and_broadcasts_to_others() {
        // テスト項目: join で名前が更新され、他の参加者に user_updated が届く
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, mut rx_alice) = connect(&fixture).await;
        let (_bob, mut rx_bob) = connect(&fixture).await;

        // when (操作):
        fixture.usecase.execute(alice.id(), join("alice")).await.unwrap();

        // then (期待する結果):
        let ServerMessage::UserUpdated(updated) = recv_message(&mut rx_bob) else {
            panic!("expected user_updated");
        };
        assert_eq!(updated.id, "u-1");
        assert_eq!(updated.name, "alice");
        assert!(rx_alice.try_recv().is_err());
        let stored = fixture.registry.get(&alice.id()).unwrap();
        assert_eq!(stored.participant.name, "alice");
        let persisted = fixture
            .identity
            .get_by_id(&stored.participant.id)
            .await
            .unwrap();
        assert_eq!(persisted.name, "alice");
    }

    #[tokio::test]
    async fn test_join_with_empty_name_still_broadcasts() {
        // テスト項目: 空の名前での join は何も変更しないが user_updated はブロードキャストされる
        // given (前提条件):
        let mut identity = MockIdentityResolver::new();
        identity.expect_update().never();
        let fixture = create_fixture(Arc::new(identity));
        let alice_participant = participant(1, "alice");
        let (alice, _rx_alice) = register(&fixture, alice_participant.clone());
        let (_bob, mut rx_bob) = register(&fixture, participant(2, ""));

        // when (操作):
        fixture.usecase.execute(alice.id(), join("")).await.unwrap();

        // then (期待する結果):
        let ServerMessage::UserUpdated(updated) = recv_message(&mut rx_bob) else {
            panic!("expected user_updated");
        };
        assert_eq!(updated, ParticipantDto::from(&alice_participant));
        assert_eq!(
            fixture.registry.get(&alice.id()).unwrap().participant,
            alice_participant
        );
    }

    #[tokio::test]
    async fn test_join_identity_failure_changes_nothing() {
        // テスト項目: 参加者情報の保存に失敗した場合はエラーになり、何も配信されない
        // given (前提条件):
        let mut identity = MockIdentityResolver::new();
        identity
            .expect_update()
            .returning(|p| Err(IdentityError::NotFound(p.id.to_string())));
        let fixture = create_fixture(Arc::new(identity));
        let (alice, _rx_alice) = register(&fixture, participant(1, ""));
        let (_bob, mut rx_bob) = register(&fixture, participant(2, ""));

        // when (操作):
        let result = fixture.usecase.execute(alice.id(), join("alice")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(SessionError::Identity(_))));
        assert!(rx_bob.try_recv().is_err());
        assert_eq!(fixture.registry.get(&alice.id()).unwrap().participant.name, "");
    }

    #[tokio::test]
    async fn test_cursor_fans_out_to_others_only() {
        // テスト項目: cursor は送信者以外の全員に {id, cursor} で配信される
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, mut rx_alice) = connect(&fixture).await;
        let (_bob, mut rx_bob) = connect(&fixture).await;
        let (_carol, mut rx_carol) = connect(&fixture).await;

        // when (操作):
        fixture
            .usecase
            .execute(
                alice.id(),
                ClientMessage::Cursor(CursorDto {
                    index: 5,
                    length: 2,
                }),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let expected = ServerMessage::Cursor(CursorUpdatePayload {
            id: "u-1".to_string(),
            cursor: CursorDto {
                index: 5,
                length: 2,
            },
        });
        assert_eq!(recv_message(&mut rx_bob), expected);
        assert_eq!(recv_message(&mut rx_carol), expected);
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cursor_is_recorded_in_memory_mode() {
        // テスト項目: インメモリの参加者ストアではカーソルが参加者に保存される
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, _rx_alice) = connect(&fixture).await;

        // when (操作):
        fixture
            .usecase
            .execute(
                alice.id(),
                ClientMessage::Cursor(CursorDto {
                    index: 3,
                    length: 0,
                }),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let id = fixture.registry.get(&alice.id()).unwrap().participant.id;
        let persisted = fixture.identity.get_by_id(&id).await.unwrap();
        assert_eq!(persisted.cursor, Cursor::new(3, 0));
    }

    #[tokio::test]
    async fn test_join_after_cursor_keeps_cursor_broadcast_only_without_tracking() {
        // テスト項目: カーソルを保存しないモードでは、カーソル移動後の join でもカーソルは保存されない
        // given (前提条件):
        let fixture = create_fixture(Arc::new(
            InMemoryParticipantRepository::without_cursor_tracking(Arc::new(FixedClock::new(0))),
        ));
        let (alice, _rx_alice) = connect(&fixture).await;
        fixture
            .usecase
            .execute(
                alice.id(),
                ClientMessage::Cursor(CursorDto {
                    index: 5,
                    length: 2,
                }),
            )
            .await
            .unwrap();

        // when (操作):
        fixture
            .usecase
            .execute(
                alice.id(),
                ClientMessage::Join(JoinPayload {
                    name: "alice".to_string(),
                }),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let live = fixture.registry.get(&alice.id()).unwrap().participant;
        assert_eq!(live.cursor, Cursor::new(5, 2));
        let persisted = fixture.identity.get_by_id(&live.id).await.unwrap();
        assert_eq!(persisted.name, "alice");
        assert_eq!(persisted.cursor, Cursor::default());
    }

    #[tokio::test]
    async fn test_doc_update_broadcasts_to_everyone_including_sender() {
        // テスト項目: 更新に成功すると送信者を含む全員に doc_state が届く
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, mut rx_alice) = connect(&fixture).await;
        let (_bob, mut rx_bob) = connect(&fixture).await;

        // when (操作):
        fixture
            .usecase
            .execute(alice.id(), doc_update("hello", 0))
            .await
            .unwrap();

        // then (期待する結果):
        let expected = ServerMessage::DocState(DocPayload {
            content: "hello".to_string(),
            version: 1,
        });
        assert_eq!(recv_message(&mut rx_alice), expected);
        assert_eq!(recv_message(&mut rx_bob), expected);
        assert_eq!(fixture.store.get(), ("hello".to_string(), Version::new(1)));
    }

    #[tokio::test]
    async fn test_stale_doc_update_is_corrected_for_sender_only() {
        // テスト項目: 古いバージョンに基づく更新は拒否され、送信者だけに現在の状態が届く
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, mut rx_alice) = connect(&fixture).await;
        let (bob, mut rx_bob) = connect(&fixture).await;
        fixture
            .usecase
            .execute(alice.id(), doc_update("hello", 0))
            .await
            .unwrap();
        recv_message(&mut rx_alice);
        recv_message(&mut rx_bob);

        // when (操作):
        fixture
            .usecase
            .execute(bob.id(), doc_update("world", 0))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            recv_message(&mut rx_bob),
            ServerMessage::DocState(DocPayload {
                content: "hello".to_string(),
                version: 1,
            })
        );
        assert!(rx_alice.try_recv().is_err());
        assert_eq!(fixture.store.get(), ("hello".to_string(), Version::new(1)));
    }

    #[tokio::test]
    async fn test_ping_answers_sender_only() {
        // テスト項目: ping には送信者だけに pong が一度返される
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (alice, mut rx_alice) = connect(&fixture).await;
        let (_bob, mut rx_bob) = connect(&fixture).await;

        // when (操作):
        fixture
            .usecase
            .execute(alice.id(), ClientMessage::Ping)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(recv_message(&mut rx_alice), ServerMessage::Pong);
        assert!(rx_alice.try_recv().is_err());
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_message_from_unregistered_connection_is_error() {
        // テスト項目: 登録されていない接続からのメッセージはエラーになる
        // given (前提条件):
        let fixture = in_memory_fixture();
        let (tx, _rx) = mpsc::unbounded_channel();
        let stranger = Connection::new(tx);

        // when (操作):
        let result = fixture
            .usecase
            .execute(stranger.id(), ClientMessage::Ping)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SessionError::Registry(_))));
    }
}
