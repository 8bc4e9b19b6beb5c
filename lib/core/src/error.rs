//! Result alias shared by the kodi crates.
//!
//! The relay and its peers keep their own error enums (`RelayError`,
//! `PeerError`, `ConfigError`) and return them wrapped in a
//! [`rootcause::Report`], so a failure logged by a binary carries the
//! context of every layer it passed through.

use rootcause::Report;

/// Result whose error is a [`Report`] over the context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
