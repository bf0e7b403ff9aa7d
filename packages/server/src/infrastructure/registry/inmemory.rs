//! In-memory connection registry.
//!
//! A single `RwLock` guards the map. Writers (add/remove/update) take it
//! exclusively, lookups share it. `get_all` clones the bindings out before the
//! guard drops so that broadcast fan-out, which may evict entries, never runs
//! while the lock is held.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::domain::{
    Client, ClientRegistry, ConnectionId, Participant, ParticipantId, RegistryError,
};

/// インメモリ接続レジストリ
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    clients: RwLock<HashMap<ConnectionId, Client>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConnectionId, Client>> {
        self.clients.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConnectionId, Client>> {
        self.clients.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientRegistry for InMemoryClientRegistry {
    fn add(&self, client: Client) {
        let connection_id = client.connection.id();
        self.write().insert(connection_id, client);
        tracing::debug!("Connection '{}' registered", connection_id);
    }

    fn remove(&self, connection_id: &ConnectionId) -> Option<Client> {
        let removed = self.write().remove(connection_id);
        if removed.is_some() {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
        removed
    }

    fn get(&self, connection_id: &ConnectionId) -> Result<Client, RegistryError> {
        self.read()
            .get(connection_id)
            .cloned()
            .ok_or(RegistryError::ConnectionNotFound(*connection_id))
    }

    fn get_all(&self) -> Vec<Client> {
        self.read().values().cloned().collect()
    }

    fn get_by_participant_id(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<Client, RegistryError> {
        self.read()
            .values()
            .find(|client| &client.participant.id == participant_id)
            .cloned()
            .ok_or_else(|| RegistryError::ParticipantNotFound(participant_id.to_string()))
    }

    fn update_participant(
        &self,
        connection_id: &ConnectionId,
        participant: Participant,
    ) -> Result<(), RegistryError> {
        let mut clients = self.write();
        let client = clients
            .get_mut(connection_id)
            .ok_or(RegistryError::ConnectionNotFound(*connection_id))?;
        client.participant = participant;
        Ok(())
    }

    fn count(&self) -> usize {
        self.read().len()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{Color, Connection, Timestamp};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続 ID をキーとした追加・削除・取得
    // - get_all がスナップショットを返すこと
    // - 並行した add/remove の後も登録内容が一貫していること
    // ========================================

    fn create_test_client(participant_id: &str) -> Client {
        let (tx, _rx) = mpsc::unbounded_channel();
        Client::new(
            Connection::new(tx),
            Participant::new(
                ParticipantId::new(participant_id.to_string()).unwrap(),
                participant_id.to_string(),
                Color::for_sequence(0),
                Timestamp::new(1000),
            ),
            None,
        )
    }

    #[test]
    fn test_add_and_get() {
        // テスト項目: 追加したバインディングを接続 ID で取得できる
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let client = create_test_client("alice");

        // when (操作):
        registry.add(client.clone());

        // then (期待する結果):
        assert_eq!(registry.get(&client.connection.id()), Ok(client));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_add_same_connection_overwrites() {
        // テスト項目: 同じ接続で再追加すると上書きされ、件数は増えない
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let mut client = create_test_client("alice");
        registry.add(client.clone());

        // when (操作):
        client.participant.name = "Alice".to_string();
        registry.add(client.clone());

        // then (期待する結果):
        assert_eq!(registry.count(), 1);
        assert_eq!(
            registry.get(&client.connection.id()).unwrap().participant.name,
            "Alice"
        );
    }

    #[test]
    fn test_remove_missing_is_noop() {
        // テスト項目: 未登録の接続の削除は何もしない
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        registry.add(create_test_client("alice"));

        // when (操作):
        let removed = registry.remove(&ConnectionId::generate());

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        // テスト項目: 未登録の接続の取得は NotFound エラーになる
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let missing = ConnectionId::generate();

        // when (操作):
        let result = registry.get(&missing);

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::ConnectionNotFound(missing)));
    }

    #[test]
    fn test_get_by_participant_id() {
        // テスト項目: 参加者 ID でバインディングを検索できる
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let alice = create_test_client("alice");
        registry.add(alice.clone());
        registry.add(create_test_client("bob"));

        // when (操作):
        let found = registry.get_by_participant_id(&alice.participant.id);
        let missing =
            registry.get_by_participant_id(&ParticipantId::new("carol".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(found, Ok(alice));
        assert_eq!(
            missing,
            Err(RegistryError::ParticipantNotFound("carol".to_string()))
        );
    }

    #[test]
    fn test_get_all_is_a_snapshot() {
        // テスト項目: get_all の結果はその後の変更の影響を受けない
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let alice = create_test_client("alice");
        registry.add(alice.clone());
        registry.add(create_test_client("bob"));

        // when (操作):
        let snapshot = registry.get_all();
        registry.remove(&alice.connection.id());

        // then (期待する結果):
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.get_all().len(), 1);
    }

    #[test]
    fn test_update_participant() {
        // テスト項目: 登録済みバインディングの参加者を差し替えられる
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let client = create_test_client("alice");
        registry.add(client.clone());
        let mut participant = client.participant.clone();
        participant.name = "Alice Liddell".to_string();

        // when (操作):
        let result = registry.update_participant(&client.connection.id(), participant.clone());
        let missing = registry.update_participant(&ConnectionId::generate(), participant.clone());

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(missing.is_err());
        assert_eq!(
            registry.get(&client.connection.id()).unwrap().participant,
            participant
        );
    }

    #[test]
    fn test_concurrent_add_remove_is_consistent() {
        // テスト項目: 並行した add/remove の後、削除されていないものだけが残る
        // given (前提条件):
        let registry = Arc::new(InMemoryClientRegistry::new());
        let clients: Vec<Client> = (0..64)
            .map(|i| create_test_client(&format!("user-{}", i)))
            .collect();

        // when (操作): 各スレッドが追加し、偶数番目のみ削除する
        let handles: Vec<_> = clients
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, client)| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let id = client.connection.id();
                    registry.add(client);
                    if i % 2 == 0 {
                        registry.remove(&id);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // then (期待する結果):
        let remaining: HashSet<ConnectionId> = registry
            .get_all()
            .iter()
            .map(|c| c.connection.id())
            .collect();
        let expected: HashSet<ConnectionId> = clients
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 1)
            .map(|(_, c)| c.connection.id())
            .collect();
        assert_eq!(remaining, expected);
    }
}
