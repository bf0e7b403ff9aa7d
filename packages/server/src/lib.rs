//! Real-time collaboration server.
//!
//! Keeps every connected client in sync with one shared document using
//! optimistic version checks, over a small JSON protocol on WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod bootstrap;
pub mod config;
