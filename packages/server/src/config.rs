//! Server configuration.

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

use crate::domain::ValueObjectError;

/// Default per-document connection cap.
pub const DEFAULT_MAX_CONNECTIONS: usize = 25;

/// Where the shared document lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DocumentBacking {
    /// Ephemeral document held by this process; participants track their cursors.
    #[default]
    Memory,
    /// Document backed by a versioned note row; cursors are broadcast only.
    Note,
}

impl fmt::Display for DocumentBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentBacking::Memory => f.write_str("memory"),
            DocumentBacking::Note => f.write_str("note"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host must not be blank")]
    BlankHost,

    #[error("document id must not be empty")]
    EmptyDocumentId,

    #[error("max connections must be at least 1")]
    ZeroConnectionCap,

    #[error("invalid document id: {0}")]
    InvalidDocumentId(#[from] ValueObjectError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backing: DocumentBacking,
    pub document_id: String,
    pub initial_content: String,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backing: DocumentBacking::default(),
            document_id: "default".to_string(),
            initial_content: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::BlankHost);
        }
        if self.document_id.trim().is_empty() {
            return Err(ConfigError::EmptyDocumentId);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroConnectionCap);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
