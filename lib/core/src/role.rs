//! Relay roles.
//!
//! Every connection declares exactly one role in its first message. The
//! relay addresses messages by role, so either side can reconnect and pick
//! up forwarding without renegotiation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical identity a connection declares once.
///
/// Exactly two roles exist and they pair with each other:
/// - `Initiator`: the human-facing terminal client (wire token `USER`)
/// - `Responder`: the automated conversational responder (wire token `BOT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Human-facing peer.
    Initiator,
    /// Automated responder peer.
    Responder,
}

impl Role {
    /// Wire token declaring the initiator role.
    pub const INITIATOR_DECLARATION: &'static str = "USER";

    /// Wire token declaring the responder role.
    pub const RESPONDER_DECLARATION: &'static str = "BOT";

    /// Interprets a role declaration message.
    ///
    /// Surrounding whitespace is ignored. Anything other than the two wire
    /// tokens, including an empty declaration, falls back to `Initiator`.
    #[must_use]
    pub fn from_declaration(declaration: &str) -> Self {
        match declaration.trim() {
            Self::RESPONDER_DECLARATION => Self::Responder,
            _ => Self::Initiator,
        }
    }

    /// Returns the wire token a peer sends to claim this role.
    #[must_use]
    pub const fn declaration(&self) -> &'static str {
        match self {
            Self::Initiator => Self::INITIATOR_DECLARATION,
            Self::Responder => Self::RESPONDER_DECLARATION,
        }
    }

    /// Returns the role messages from this role are forwarded to.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Initiator => Self::Responder,
            Self::Responder => Self::Initiator,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "INITIATOR"),
            Self::Responder => write!(f, "RESPONDER"),
        }
    }
}
