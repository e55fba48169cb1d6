//! Settings sections of the configuration file
//!
//! # Main Types
//!
//! - [`ServerConfig`] - Where the ChirpStack API lives and how to authenticate
//! - [`NodeConfig`] - Static parameters of one multicast node
//! - [`LoggingConfig`] - Optional log file output
//!
//! `ServerConfig` holds the API token; its `Debug` output never shows it.

use crate::error::{MulticastError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Port used when neither the configuration nor the message names one.
pub const DEFAULT_F_PORT: u32 = 10;

/// Delay before a successful status returns to idle, in milliseconds.
pub const DEFAULT_STATUS_RESET_MS: u64 = 3000;

/// Connection settings for one ChirpStack server
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// gRPC endpoint, e.g. `localhost:8080` or `http://chirpstack:8080`
    #[serde(default)]
    pub server: String,

    /// API token sent as `authorization: Bearer <token>`
    #[serde(default)]
    pub api_token: String,
}

impl ServerConfig {
    pub fn new(server: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            api_token: api_token.into(),
        }
    }

    /// Both the server address and the token must be set.
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(MulticastError::Config(
                "server address is not configured".to_string(),
            ));
        }
        if self.api_token.trim().is_empty() {
            return Err(MulticastError::Config(
                "API token is not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoint URI with a scheme, adding `http://` to bare `host:port` addresses.
    pub fn endpoint_uri(&self) -> String {
        let server = self.server.trim();
        if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.api_token.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ServerConfig")
            .field("server", &self.server)
            .field("api_token", &token)
            .finish()
    }
}

/// Static parameters of a multicast node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Group to enqueue to. Takes precedence over the message.
    #[serde(default)]
    pub multicast_group_id: Option<String>,

    /// Application port. Takes precedence over the message.
    #[serde(default)]
    pub f_port: Option<u32>,

    /// Port used when nothing else provides one
    #[serde(default = "default_f_port")]
    pub default_f_port: u32,

    /// Log each request's parameters and payload encodings
    #[serde(default)]
    pub debug: bool,

    /// Delay before a successful status returns to idle (milliseconds)
    #[serde(default = "default_status_reset_ms")]
    pub status_reset_ms: u64,
}

fn default_f_port() -> u32 {
    DEFAULT_F_PORT
}

fn default_status_reset_ms() -> u64 {
    DEFAULT_STATUS_RESET_MS
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            multicast_group_id: None,
            f_port: None,
            default_f_port: DEFAULT_F_PORT,
            debug: false,
            status_reset_ms: DEFAULT_STATUS_RESET_MS,
        }
    }
}

impl NodeConfig {
    pub fn with_group_id(mut self, id: impl Into<String>) -> Self {
        self.multicast_group_id = Some(id.into());
        self
    }

    pub fn with_f_port(mut self, f_port: u32) -> Self {
        self.f_port = Some(f_port);
        self
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }
}

/// Log file output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files. Stderr only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Log file name prefix
    #[serde(default)]
    pub file_prefix: Option<String>,

    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default)]
    pub filter: Option<String>,
}
