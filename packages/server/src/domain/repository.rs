//! Repository trait 定義
//!
//! 永続化されたノートへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{entity::Note, error::RepositoryError, value_object::Version};

/// Note Repository trait
///
/// The relational store itself lives outside this crate; the collaboration
/// layer only needs versioned read and compare-and-save.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn get_note(&self, id: &str) -> Result<Note, RepositoryError>;

    /// Persist `content` if the stored row is still at `expected`, bumping
    /// its version. Returns the saved row.
    async fn save_if_version(
        &self,
        id: &str,
        content: String,
        expected: Version,
    ) -> Result<Note, RepositoryError>;
}
