//! UseCase: 参加者の解決
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ResolveParticipantUseCase::execute() メソッド
//! - 要求された ID の参加者の取得、または新規参加者の発行
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存 ID での再接続
//! - 正常系：ID なしでの接続（新規発行）
//! - 異常系：未知の ID・不正な ID（新規発行にフォールバック）
//! - 異常系：新規発行の失敗

use std::sync::Arc;

use crate::domain::{IdentityError, IdentityResolver, Participant, ParticipantId};

/// 参加者解決のユースケース
pub struct ResolveParticipantUseCase {
    /// IdentityResolver（参加者の取得・作成の抽象化）
    identity: Arc<dyn IdentityResolver>,
}

impl ResolveParticipantUseCase {
    pub fn new(identity: Arc<dyn IdentityResolver>) -> Self {
        Self { identity }
    }

    /// Look up the requested participant, minting a new one when there is none.
    ///
    /// Only a failure to mint is an error; every lookup failure falls back.
    pub async fn execute(&self, requested: Option<String>) -> Result<Participant, IdentityError> {
        if let Some(raw) = requested {
            match ParticipantId::new(raw.clone()) {
                Ok(id) => match self.identity.get_by_id(&id).await {
                    Ok(participant) => {
                        tracing::debug!("Resolved existing participant '{}'", participant.id);
                        return Ok(participant);
                    }
                    Err(e) => {
                        tracing::info!(
                            "Participant '{}' not resolved ({}), minting a new one",
                            id,
                            e
                        )
                    }
                },
                Err(e) => tracing::warn!("Ignoring invalid user_id '{}': {}", raw, e),
            }
        }

        let participant = self.identity.create(String::new()).await?;
        tracing::info!("Minted participant '{}'", participant.id);
        Ok(participant)
    }
}
