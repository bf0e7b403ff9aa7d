//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の切断処理（登録解除、user_left の通知）
//!
//! ### なぜこのテストが必要か
//! - 切断時に残りの参加者全員に一度だけ通知されることを保証
//! - 送信失敗で既に登録解除された接続でも通知されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし）
//! - エッジケース：既にレジストリから除去された接続の切断

use std::sync::Arc;

use crate::{
    domain::{Client, ClientRegistry, ConnectionId, MessagePusher, ParticipantId},
    infrastructure::dto::websocket::{ServerMessage, UserLeftPayload},
};

use super::outbound;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// ClientRegistry（接続中のクライアントの管理）
    registry: Arc<dyn ClientRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<dyn ClientRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// The binding is removed first, so `user_left` only reaches the connections
    /// that remain. The departure is announced even when the binding was already
    /// evicted after a failed write.
    ///
    /// # Returns
    ///
    /// 登録解除されたクライアント（既に除去されていた場合は `None`）
    pub fn execute(
        &self,
        connection_id: &ConnectionId,
        participant_id: &ParticipantId,
    ) -> Option<Client> {
        let removed = self.registry.remove(connection_id);
        if removed.is_none() {
            tracing::debug!(
                "Connection '{}' was already evicted from the registry",
                connection_id
            );
        }

        let left = ServerMessage::UserLeft(UserLeftPayload {
            id: participant_id.to_string(),
        });
        match outbound::broadcast(self.message_pusher.as_ref(), &left, None) {
            Ok(notified) => tracing::info!(
                "Participant '{}' left, notified {} connection(s)",
                participant_id,
                notified
            ),
            Err(e) => tracing::warn!("Failed to broadcast user_left: {}", e),
        }

        removed
    }
}
