//! Core types shared by the kodi relay, its peers, and the dialogue engine.
//!
//! This crate provides the foundational types and error handling used by
//! every other crate in the workspace: the [`Role`] a connection declares,
//! the [`ConnectionId`] the relay assigns to it, and the rootcause-based
//! [`Result`] alias.

pub mod error;
pub mod id;
pub mod role;

pub use error::Result;
pub use id::ConnectionId;
pub use role::Role;
