//! メッセージ送信（通知）の実装
//!
//! `MessagePusher` trait の具体的な実装を提供します。
//!
//! - `websocket`: 接続レジストリに登録された WebSocket 接続への送信

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
