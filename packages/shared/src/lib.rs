//! Utilities shared by the notecollab server and client.

pub mod logger;
pub mod time;
