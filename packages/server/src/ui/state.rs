//! Shared application state.

use std::sync::Arc;

use crate::usecase::{CollaborationSession, ResolveParticipantUseCase};

use super::tracker::ConnectionTracker;

/// Shared application state
pub struct AppState {
    /// ResolveParticipantUseCase（参加者解決のユースケース）
    pub resolve_participant_usecase: Arc<ResolveParticipantUseCase>,
    /// CollaborationSession（接続ごとの処理の入口）
    pub session: Arc<CollaborationSession>,
    /// Upgraded connections still running
    pub connections: Arc<ConnectionTracker>,
}
