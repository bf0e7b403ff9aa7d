//! Shared document sources.
//!
//! - `inmemory`: ephemeral document held by this process
//! - `note`: document backed by a persisted note row

pub mod inmemory;
pub mod note;

pub use inmemory::SharedDocumentStore;
pub use note::NoteDocumentSource;
