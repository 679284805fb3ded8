// File: src/chat/core/ids.rs

//! Identifier types for conversation messages and send exchanges.
//!
//! Messages come from two places: optimistic entries created on the client
//! and persisted history returned by the backend. Client ids are UUIDs,
//! server ids are whatever the backend assigned (strings or integers on the
//! wire), so [`MessageId`] stores the textual form of either.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: enables `UUIDv7` generation via `uuid/v7`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Generate an ID that sorts roughly by creation time when possible.
///
/// With feature `uuid_v7` enabled, this uses `Uuid::now_v7()`.
/// Otherwise it falls back to `Uuid::new_v4()`.
#[inline]
#[must_use]
fn uuid_time_ordered() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Identifier of one message in the conversation timeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a fresh client-side identifier.
    #[must_use]
    pub fn local() -> Self {
        Self(uuid_time_ordered().to_string())
    }

    /// Wrap an identifier assigned by the backend.
    #[must_use]
    pub fn from_server(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MessageId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(Self::from_server(trimmed))
    }
}

/// Wire representation accepted for server ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawId::Number(number) => Ok(Self::from_server(number.to_string())),
        }
    }
}

/// Errors returned when parsing a [`MessageId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdParseError {
    /// Empty (or whitespace-only) identifier.
    Empty,
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "message id must not be empty"),
        }
    }
}

impl std::error::Error for IdParseError {}

/// Correlation identifier for one send round-trip, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    /// Create a new exchange identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid_time_ordered())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
