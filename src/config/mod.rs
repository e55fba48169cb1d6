//! Configuration module for the multicast node
//!
//! One TOML file describes the server connection, the node's static
//! parameters and logging:
//!
//! ```toml
//! [server]
//! server = "localhost:8080"
//! api_token = "..."
//!
//! [node]
//! multicast_group_id = "5f2e0c1a-..."
//! f_port = 10
//! debug = false
//!
//! [logging]
//! directory = "/var/log/chirpstack-multicast"
//! ```
//!
//! # Config Location
//!
//! Without an explicit path the file is read from the platform config dir:
//! - **Linux**: `~/.config/dev.chirpstack.multicast/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.chirpstack.multicast/config.toml`
//! - **Windows**: `%APPDATA%\dev.chirpstack.multicast\config.toml`
//!
//! The `CHIRPSTACK_API_TOKEN` environment variable overrides the token in the file.

pub mod settings;

pub use settings::*;

use crate::error::{MulticastError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.chirpstack.multicast";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `server.api_token`
pub const API_TOKEN_ENV: &str = "CHIRPSTACK_API_TOKEN";

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(MulticastError::from)
    }

    /// Render the config as TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(MulticastError::from)
    }

    /// Load a config file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.apply_env();
        tracing::debug!("Loaded config from {:?}: {:?}", path, config.server);
        Ok(config)
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self> {
        let path = default_config_path().ok_or_else(|| {
            MulticastError::Config("Could not determine config directory".to_string())
        })?;
        Self::load(path)
    }

    /// Save the config, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory {}", parent.display())
                })?;
            }
        }
        let text = self.to_toml()?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Replace the API token from `CHIRPSTACK_API_TOKEN` when it is set
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            if !token.is_empty() {
                self.server.api_token = token;
            }
        }
    }

    /// Check everything a node needs before it can start
    pub fn validate(&self) -> Result<()> {
        self.server.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            server = "localhost:8080"
            api_token = "abc"

            [node]
            multicast_group_id = "grp-1"
            f_port = 20
            debug = true
            status_reset_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.server, "localhost:8080");
        assert_eq!(cfg.node.multicast_group_id.as_deref(), Some("grp-1"));
        assert_eq!(cfg.node.f_port, Some(20));
        assert_eq!(cfg.node.default_f_port, DEFAULT_F_PORT);
        assert!(cfg.node.debug);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_invalid() {
        let cfg = AppConfig::from_toml("").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_toml() {
        let err = AppConfig::from_toml("[server\nserver=").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut cfg = AppConfig::default();
        cfg.server = ServerConfig::new("cs:8080", "tok");
        cfg.node = NodeConfig::default().with_group_id("g").with_f_port(5);
        let text = cfg.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), cfg);
    }
}
