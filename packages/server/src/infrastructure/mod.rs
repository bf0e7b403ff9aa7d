//! Infrastructure layer: in-memory stores, the WebSocket pusher and wire DTOs.

pub mod document;
pub mod dto;
pub mod message_pusher;
pub mod registry;
pub mod repository;
