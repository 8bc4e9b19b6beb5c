//! Role-addressed message relay for kodi.
//!
//! This crate provides:
//!
//! - **Role Registry**: Shared map from each role to its live connection
//! - **Relay loop**: Per-connection declare, register, forward, cleanup
//! - **Relay Server**: TCP accept loop with one supervised task per connection
//! - **Peer client**: Client side of the protocol, used by both peers
//! - **Responder loop**: Feeds relayed text through the dialogue engine
//!
//! Messages are addressed by role rather than by connection, so either
//! peer can drop and reconnect without any renegotiation.

pub mod config;
pub mod connection;
pub mod error;
pub mod peer;
pub mod registry;
pub mod responder;
pub mod server;

pub use config::RelayConfig;
pub use connection::{MessageReader, NO_PARTNER_NOTICE, handle_connection};
pub use error::{ConfigError, PeerError, RelayError};
pub use peer::PeerClient;
pub use registry::{PeerHandle, RoleRegistry};
pub use responder::run_responder;
pub use server::RelayServer;
