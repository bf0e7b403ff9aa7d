//! InMemory Repository 実装
//!
//! HashMap をインメモリ DB として使用します。永続化ストアの代わりに、
//! 開発時やテスト時に使います。

pub mod note;
pub mod participant;

pub use note::InMemoryNoteRepository;
pub use participant::InMemoryParticipantRepository;
