//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続レジストリのスナップショットに対するブロードキャスト
//! - 送信に失敗した接続のクローズと登録解除
//!
//! ## 設計ノート
//!
//! WebSocket そのものは UI 層（`ui/handler/websocket.rs`）の pusher タスクが所有します。
//! ここでは各接続の `PusherChannel` に書き込むだけなので、送信はブロックしません。

use std::sync::Arc;

use crate::domain::{ClientRegistry, Connection, ConnectionId, MessagePushError, MessagePusher};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    registry: Arc<dyn ClientRegistry>,
}

impl WebSocketMessagePusher {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn push_to(&self, connection: &Connection, content: &str) -> Result<(), MessagePushError> {
        connection.push(content)?;
        tracing::debug!("Pushed message to connection '{}'", connection.id());
        Ok(())
    }

    fn broadcast(&self, content: &str, except: Option<ConnectionId>) -> usize {
        // Owned snapshot: evicting below never contends with our own read guard.
        let clients = self.registry.get_all();
        let mut delivered = 0;

        for client in clients {
            let connection_id = client.connection.id();
            if Some(connection_id) == except {
                continue;
            }

            // ブロードキャストでは一部の送信失敗を許容
            match client.connection.push(content) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push message to participant '{}': {}",
                        client.participant.id,
                        e
                    );
                    client.connection.close();
                    self.registry.remove(&connection_id);
                }
            }
        }

        delivered
    }
}
