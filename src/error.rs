//! Error handling for the multicast enqueue node
//!
//! This module defines the crate-level error type and a Result alias. Errors
//! raised while handling a single message live in
//! [`crate::pipeline::PipelineError`]; the variants here are the ones that stop
//! a node from being created or the host from running.

use thiserror::Error;

/// Main error type for node setup and host operations
#[derive(Error, Debug)]
pub enum MulticastError {
    /// Missing or invalid server/node configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The gRPC endpoint could not be set up
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MulticastError>,
    },
}

impl MulticastError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MulticastError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a configuration error
    pub fn is_config(&self) -> bool {
        match self {
            MulticastError::Config(_) => true,
            MulticastError::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for MulticastError {
    fn from(err: serde_json::Error) -> Self {
        MulticastError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MulticastError {
    fn from(err: toml::de::Error) -> Self {
        MulticastError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MulticastError {
    fn from(err: toml::ser::Error) -> Self {
        MulticastError::Serialization(err.to_string())
    }
}

/// Result type alias for node setup and host operations
pub type Result<T> = std::result::Result<T, MulticastError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MulticastError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| MulticastError::Io(e).with_context(f()))
    }
}
