//! Backend module for talking to the ChirpStack API
//!
//! # Components
//!
//! - [`MulticastQueue`] - The enqueue RPC as a trait, implemented over gRPC
//!   by [`GrpcQueueClient`] and by test doubles
//! - [`ConnectionProvider`] - Endpoint, credential and shared channel for one
//!   server; created once and handed to any number of nodes
//! - [`proto`] - Wire messages and the raw service client
//!
//! # Example
//!
//! ```ignore
//! use chirpstack_multicast::backend::ConnectionProvider;
//! use chirpstack_multicast::config::ServerConfig;
//!
//! let server = ServerConfig::new("localhost:8080", token);
//! let provider = ConnectionProvider::connect(&server)?;
//! let node_a = MulticastNode::new(config_a, Some(&provider), surface.clone())?;
//! let node_b = MulticastNode::new(config_b, Some(&provider), surface)?;
//! ```

pub mod client_trait;
pub mod grpc;
pub mod proto;

pub use client_trait::{
    AuthMetadata, EnqueueResponse, MulticastQueue, RemoteError, AUTHORIZATION_HEADER,
};
#[cfg(test)]
pub use client_trait::MockMulticastQueue;
pub use grpc::GrpcQueueClient;

use crate::config::ServerConfig;
use crate::error::Result;
use std::sync::Arc;

/// Shared connection to one remote service
///
/// Read-only after construction; clones share the same channel.
#[derive(Clone)]
pub struct ConnectionProvider {
    endpoint: String,
    auth: AuthMetadata,
    queue: Arc<dyn MulticastQueue>,
}

impl ConnectionProvider {
    /// Validate the server config and open a lazy gRPC channel to it
    pub fn connect(server: &ServerConfig) -> Result<Self> {
        server.validate()?;
        let auth = AuthMetadata::bearer(&server.api_token)?;
        let client = GrpcQueueClient::connect_lazy(server)?;
        Ok(Self {
            endpoint: client.endpoint().to_string(),
            auth,
            queue: Arc::new(client),
        })
    }

    /// Use an existing queue implementation for the given server config
    pub fn with_queue(server: &ServerConfig, queue: Arc<dyn MulticastQueue>) -> Result<Self> {
        server.validate()?;
        let auth = AuthMetadata::bearer(&server.api_token)?;
        Ok(Self {
            endpoint: server.endpoint_uri(),
            auth,
            queue,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth(&self) -> &AuthMetadata {
        &self.auth
    }

    /// Handle to the shared channel
    pub fn queue(&self) -> Arc<dyn MulticastQueue> {
        Arc::clone(&self.queue)
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .finish()
    }
}
