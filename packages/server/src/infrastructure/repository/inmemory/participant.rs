//! InMemory Participant Repository 実装
//!
//! ドメイン層が定義する IdentityResolver trait の具体的な実装。
//! 参加者は切断後も保持されるため、同じ ID で再接続できます。

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use notecollab_shared::time::Clock;

use crate::domain::{
    Color, Cursor, IdentityError, IdentityResolver, Participant, ParticipantId, Timestamp,
};

/// インメモリ参加者リポジトリ
pub struct InMemoryParticipantRepository {
    participants: RwLock<HashMap<ParticipantId, Participant>>,
    /// Number of participants minted so far; drives ids and colors.
    sequence: AtomicU64,
    /// Whether cursor moves are written back to the participant record.
    track_cursors: bool,
    clock: Arc<dyn Clock>,
}

impl InMemoryParticipantRepository {
    /// Ephemeral participants; cursors are stored on the record.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            participants: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            track_cursors: true,
            clock,
        }
    }

    /// Account-style participants; cursors stay broadcast-only.
    pub fn without_cursor_tracking(clock: Arc<dyn Clock>) -> Self {
        Self {
            track_cursors: false,
            ..Self::new(clock)
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl IdentityResolver for InMemoryParticipantRepository {
    async fn get_by_id(&self, id: &ParticipantId) -> Result<Participant, IdentityError> {
        self.participants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))
    }

    async fn create(&self, name: String) -> Result<Participant, IdentityError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let participant = Participant::new(
            ParticipantId::ephemeral(seq),
            name,
            Color::for_sequence(seq),
            self.now(),
        );

        self.participants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant.id.clone(), participant.clone());
        tracing::debug!("Participant '{}' created", participant.id);

        Ok(participant)
    }

    async fn update(&self, participant: &Participant) -> Result<(), IdentityError> {
        let mut participants = self
            .participants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = participants
            .get_mut(&participant.id)
            .ok_or_else(|| IdentityError::NotFound(participant.id.to_string()))?;

        let cursor = stored.cursor;
        *stored = participant.clone();
        if !self.track_cursors {
            // Cursors are broadcast-only in this mode
            stored.cursor = cursor;
        }
        stored.updated_at = self.now();
        Ok(())
    }

    async fn record_cursor(&self, id: &ParticipantId, cursor: Cursor) -> Result<(), IdentityError> {
        if !self.track_cursors {
            return Ok(());
        }

        let now = self.now();
        let mut participants = self
            .participants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = participants
            .get_mut(id)
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))?;
        stored.move_cursor(cursor, now);
        Ok(())
    }
}
