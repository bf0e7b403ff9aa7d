//! Terminal client for the notecollab collaboration server.
//!
//! Keeps a local copy of the shared document, prints every server message and
//! turns typed lines into protocol messages.

mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::{ClientOptions, run_client};
