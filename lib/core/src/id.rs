//! Identifiers assigned by the relay.
//!
//! Connection IDs use ULID so log lines from concurrent connection tasks
//! sort by accept time.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique identifier for one accepted relay connection.
///
/// The registry compares handles by this ID, so a stale handle never
/// matches a newer registration for the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Ulid);

impl ConnectionId {
    /// Creates a new ID with a randomly generated ULID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

impl From<Ulid> for ConnectionId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}
