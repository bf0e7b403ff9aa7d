//! UseCase 層
//!
//! 各ユースケースはドメイン層の trait（`ClientRegistry`, `DocumentSource`,
//! `IdentityResolver`, `MessagePusher`）にのみ依存します。
//! `CollaborationSession` はそれらを束ねて、接続ごとの処理の入口を提供します。

mod connect_participant;
mod disconnect_participant;
mod dispatch_message;
pub mod error;
mod outbound;
mod resolve_participant;
mod session;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use dispatch_message::DispatchMessageUseCase;
pub use error::{ConnectError, SessionError};
pub use resolve_participant::ResolveParticipantUseCase;
pub use session::{CollaborationSession, SessionDeps};
