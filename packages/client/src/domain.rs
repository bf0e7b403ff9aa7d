//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::sync::{Arc, Mutex};

use notecollab_server::infrastructure::dto::websocket::{
    ClientMessage, CursorDto, DocPayload, JoinPayload,
};

use url::Url;

use crate::error::ClientError;

/// Local copy of the shared document, as last reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalDocument {
    pub content: String,
    pub version: i64,
}

impl LocalDocument {
    /// Replace the local copy with the server's state.
    pub fn apply_state(&mut self, content: String, version: i64) {
        self.content = content;
        self.version = version;
    }

    /// Apply a server state unless it is older than the local copy.
    ///
    /// Returns `false` when the state was ignored.
    pub fn apply_if_not_older(&mut self, content: String, version: i64) -> bool {
        if version < self.version {
            return false;
        }
        self.apply_state(content, version);
        true
    }

    /// Update request replacing the whole content, based on the local version.
    pub fn replace_with(&self, content: &str) -> DocPayload {
        DocPayload {
            content: content.to_string(),
            version: self.version,
        }
    }

    /// Update request appending `line` as a new line, based on the local version.
    pub fn append_line(&self, line: &str) -> DocPayload {
        let content = if self.content.is_empty() {
            line.to_string()
        } else {
            format!("{}\n{}", self.content, line)
        };
        DocPayload {
            content,
            version: self.version,
        }
    }
}

/// State that survives reconnects.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Participant id learnt from `init`; reused when reconnecting.
    pub participant_id: Option<String>,
    /// Display name sent with `join` after every (re)connect.
    pub name: Option<String>,
    pub document: LocalDocument,
    /// Whether `init` has arrived on the current connection.
    pub synced: bool,
    /// Newest `doc_state` seen on the current connection before its `init`.
    pub pending_state: Option<DocPayload>,
}

impl ClientState {
    /// Reset per-connection bookkeeping before a (re)connect.
    pub fn begin_connection(&mut self) {
        self.synced = false;
        self.pending_state = None;
    }

    /// Hold a `doc_state` that overtook `init`, keeping only the newest.
    pub fn hold_pending(&mut self, payload: DocPayload) {
        match &self.pending_state {
            Some(pending) if pending.version >= payload.version => {}
            _ => self.pending_state = Some(payload),
        }
    }
}

pub type SharedState = Arc<Mutex<ClientState>>;

/// One typed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rename(String),
    Cursor { index: usize, length: usize },
    Ping,
    Show,
    Set(String),
    Append(String),
    Invalid(String),
}

pub const USAGE: &str = "commands: /name NAME | /cursor INDEX LENGTH | /ping | /show | /set TEXT \
                         | any other line is appended";

/// Parse an input line into a command.
///
/// Lines not starting with `/` are appended to the document.
pub fn parse_command(line: &str) -> Command {
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Append(line.to_string());
    };
    let (name, args) = match rest.split_once(' ') {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "name" if !args.is_empty() => Command::Rename(args.to_string()),
        "name" => Command::Invalid("usage: /name NAME".to_string()),
        "cursor" => {
            let mut parts = args.split_whitespace().map(str::parse::<usize>);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(index)), Some(Ok(length)), None) => Command::Cursor { index, length },
                (Some(Ok(index)), None, None) => Command::Cursor { index, length: 0 },
                _ => Command::Invalid("usage: /cursor INDEX LENGTH".to_string()),
            }
        }
        "ping" => Command::Ping,
        "show" => Command::Show,
        "set" => Command::Set(args.to_string()),
        other => Command::Invalid(format!("unknown command '/{}'; {}", other, USAGE)),
    }
}

/// Protocol message for a command, if it produces one.
pub fn to_message(command: &Command, document: &LocalDocument) -> Option<ClientMessage> {
    match command {
        Command::Rename(name) => Some(ClientMessage::Join(JoinPayload { name: name.clone() })),
        Command::Cursor { index, length } => Some(ClientMessage::Cursor(CursorDto {
            index: *index,
            length: *length,
        })),
        Command::Ping => Some(ClientMessage::Ping),
        Command::Set(text) => Some(ClientMessage::DocUpdate(document.replace_with(text))),
        Command::Append(line) => Some(ClientMessage::DocUpdate(document.append_line(line))),
        Command::Show | Command::Invalid(_) => None,
    }
}

/// WebSocket URL for a connection attempt, resuming `participant_id` if known.
///
/// The id is form-encoded into the `user_id` query parameter.
pub fn connect_url(base: &str, participant_id: Option<&str>) -> Result<String, ClientError> {
    let mut url = Url::parse(base).map_err(|e| {
        tracing::error!("Cannot parse '{}': {}", base, e);
        ClientError::InvalidUrl(base.to_string())
    })?;
    let Some(id) = participant_id else {
        return Ok(base.to_string());
    };
    url.query_pairs_mut().append_pair("user_id", id);
    Ok(url.into())
}

/// Check if the client should exit immediately based on the error type.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
