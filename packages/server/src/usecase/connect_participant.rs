//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 接続の登録、init の送信、user_joined のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 新しい接続が現在のドキュメントと参加者一覧を受け取ることを保証
//! - ハンドシェイクに失敗した接続がレジストリに残らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存の参加者がいる状態での接続
//! - 異常系：ドキュメント取得の失敗（ハンドシェイク中断）
//! - エッジケース：接続数の上限

use std::sync::Arc;

use crate::{
    domain::{
        Client, ClientRegistry, Connection, DocumentId, DocumentSource, MessagePusher,
        Participant, PusherChannel,
    },
    infrastructure::dto::websocket::{InitPayload, ParticipantDto, ServerMessage},
};

use super::{
    error::{ConnectError, SessionError},
    outbound,
};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// ClientRegistry（接続中のクライアントの管理）
    registry: Arc<dyn ClientRegistry>,
    /// DocumentSource（共有ドキュメントの抽象化）
    documents: Arc<dyn DocumentSource>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    max_connections: usize,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        documents: Arc<dyn DocumentSource>,
        message_pusher: Arc<dyn MessagePusher>,
        max_connections: usize,
    ) -> Self {
        Self {
            registry,
            documents,
            message_pusher,
            max_connections,
        }
    }

    /// 参加者接続を実行
    ///
    /// Registers the binding, queues `init` for the new connection and announces the
    /// participant to everyone else. If `init` cannot be produced the binding is
    /// removed again and the connection is told to close.
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録された接続のハンドル
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        participant: Participant,
        document_id: DocumentId,
        channel: PusherChannel,
    ) -> Result<Connection, ConnectError> {
        // 1. 容量チェック
        if self.registry.count() >= self.max_connections {
            return Err(ConnectError::CapacityExceeded {
                max: self.max_connections,
            });
        }

        // 2. レジストリに登録
        let connection = Connection::new(channel);
        let client = Client::new(connection.clone(), participant, Some(document_id));
        self.registry.add(client.clone());

        // 3. init の送信（失敗したら登録を取り消す）
        if let Err(e) = self.send_init(&client).await {
            self.registry.remove(&connection.id());
            connection.close();
            return Err(ConnectError::Handshake(SessionError::Handshake(format!(
                "init for participant '{}' not delivered: {}",
                client.participant.id, e
            ))));
        }

        // 4. 他の参加者に user_joined をブロードキャスト
        let joined = ServerMessage::UserJoined(ParticipantDto::from(&client.participant));
        if let Err(e) = outbound::broadcast(
            self.message_pusher.as_ref(),
            &joined,
            Some(connection.id()),
        ) {
            tracing::warn!("Failed to broadcast user_joined: {}", e);
        }

        Ok(connection)
    }

    async fn send_init(&self, client: &Client) -> Result<(), SessionError> {
        let document_id = client
            .document_id
            .as_ref()
            .ok_or_else(|| SessionError::Handshake("no target document".to_string()))?;
        let document = self.documents.get(document_id).await?;

        // Sort by participant id for consistent ordering
        let mut users: Vec<Participant> = self
            .registry
            .get_all()
            .into_iter()
            .map(|c| c.participant)
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));

        let init = ServerMessage::Init(InitPayload {
            self_: ParticipantDto::from(&client.participant),
            users: users.iter().map(ParticipantDto::from).collect(),
            content: document.content,
            version: document.version.value(),
        });
        outbound::send_to(self.message_pusher.as_ref(), &client.connection, &init)
    }
}
