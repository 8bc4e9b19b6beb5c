//! Relay and peer configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `KODI__`, e.g. `KODI__PORT=6000`. The relay binds to the address and
//! both peers connect to it.

use crate::error::ConfigError;
use kodi_core::Result;
use serde::Deserialize;

/// Environment variable prefix.
const ENV_PREFIX: &str = "KODI";

/// Connection settings shared by the relay and its peers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Host the relay listens on.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port the relay listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Size of a single read; each read is one application message.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_read_buffer_size() -> usize {
    1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: config::Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                environment
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?;

        let relay_config = config.try_deserialize().map_err(|e| ConfigError::Load {
            details: e.to_string(),
        })?;
        Ok(relay_config)
    }

    /// Returns the `host:port` address of the relay.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
