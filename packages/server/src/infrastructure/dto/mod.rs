//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: collaboration protocol envelope and payloads
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain ⇄ DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
