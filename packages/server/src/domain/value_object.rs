//! Value objects of the collaboration domain.
//!
//! Identifiers are validated at construction; everything here is cheap to clone
//! and compared by value.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ID_LENGTH: usize = 128;

/// Colors handed out to participants, in join order.
pub const COLOR_PALETTE: [&str; 10] = [
    "#e11d48", // red
    "#10b981", // green
    "#3b82f6", // blue
    "#f59e0b", // yellow
    "#8b5cf6", // purple
    "#14b8a6", // teal
    "#ef4444", // red-500
    "#06b6d4", // cyan
    "#84cc16", // lime
    "#f97316", // orange
];

fn validate_id(value: &str, kind: &'static str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::EmptyId(kind));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(ValueObjectError::IdTooLong {
            kind,
            max: MAX_ID_LENGTH,
        });
    }
    Ok(())
}

/// Identity of one live transport connection.
///
/// Minted per upgrade, so a participant reconnecting gets a fresh connection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant identifier (account id or minted ephemeral id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id(&value, "participant id")?;
        Ok(Self(value))
    }

    /// Ephemeral id for the `seq`-th participant minted by this process.
    pub fn ephemeral(seq: u64) -> Self {
        Self(format!("u-{}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the shared document (or note) being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id(&value, "document id")?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cursor color of a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(&'static str);

impl Color {
    /// Deterministic palette pick for the `seq`-th participant.
    pub fn for_sequence(seq: u64) -> Self {
        let index = (seq % COLOR_PALETTE.len() as u64) as usize;
        Self(COLOR_PALETTE[index])
    }

    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// Last known caret/selection of a participant. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub length: usize,
}

impl Cursor {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

/// Document version used for optimistic concurrency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(i64);

impl Version {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
