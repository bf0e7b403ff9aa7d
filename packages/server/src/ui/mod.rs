//! UI layer: axum router, handlers and server runner.

mod handler;
mod server;
mod signal;
pub mod state;
mod tracker;

pub use server::Server;
