//! Error types for the relay crate.
//!
//! Errors are reported through `kodi_core::Result`:
//! - `RelayError`: Relay-side failures (binding, writing to a peer)
//! - `PeerError`: Client-side failures talking to the relay
//! - `ConfigError`: Configuration loading failures
//!
//! Transport faults inside a relay connection are not errors for the
//! partner: they are logged and turned into registry cleanup.

use kodi_core::ConnectionId;
use std::fmt;

/// Errors from relay operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Failed to bind the listening socket.
    Bind { addr: String, details: String },
    /// Failed to write a message to a connection.
    Write {
        connection_id: ConnectionId,
        details: String,
    },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, details } => {
                write!(f, "failed to bind relay on {addr}: {details}")
            }
            Self::Write {
                connection_id,
                details,
            } => {
                write!(f, "failed to write to {connection_id}: {details}")
            }
        }
    }
}

impl std::error::Error for RelayError {}

/// Errors from a peer's connection to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerError {
    /// Could not connect to the relay.
    Connect { addr: String, details: String },
    /// Sending a message failed.
    Send { details: String },
    /// Receiving a message failed.
    Receive { details: String },
}

impl fmt::Display for PeerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { addr, details } => {
                write!(f, "failed to connect to relay at {addr}: {details}")
            }
            Self::Send { details } => write!(f, "failed to send to relay: {details}"),
            Self::Receive { details } => {
                write!(f, "failed to receive from relay: {details}")
            }
        }
    }
}

impl std::error::Error for PeerError {}

/// Errors from loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized.
    Load { details: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
        }
    }
}

impl std::error::Error for ConfigError {}
