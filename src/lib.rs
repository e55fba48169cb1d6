//! # chirpstack-multicast: LoRaWAN multicast downlinks over gRPC
//!
//! Takes messages carrying a multicast group id and a payload, turns the
//! payload into bytes, enqueues it on a ChirpStack server's
//! `MulticastGroupService` and reports the outcome on the message.
//!
//! ## Architecture
//!
//! - **Pipeline**: per-message resolve → normalize → build → send → report,
//!   run by [`MulticastNode`]
//! - **Backend**: the enqueue RPC behind the [`MulticastQueue`] trait, with a
//!   tonic implementation and a shared [`ConnectionProvider`]
//! - **Status**: a small state machine pushed to a display surface
//! - **Communication**: crossbeam channels between the node thread and the host
//!
//! ## Example
//!
//! ```ignore
//! use chirpstack_multicast::{
//!     backend::ConnectionProvider,
//!     config::{NodeConfig, ServerConfig},
//!     pipeline::{LogStatusSurface, MulticastNode},
//!     types::Message,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> chirpstack_multicast::Result<()> {
//!     let server = ServerConfig::new("localhost:8080", "api-token");
//!     let provider = ConnectionProvider::connect(&server)?;
//!     let node = MulticastNode::new(
//!         NodeConfig::default().with_group_id("5f2e0c1a-..."),
//!         Some(&provider),
//!         Arc::new(LogStatusSurface::new("multicast")),
//!     )?;
//!
//!     let out = node.on_input(Message::new("0a0b")).await;
//!     println!("{}", out.to_json()?);
//!     node.close();
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use app::NodeHost;
pub use backend::{ConnectionProvider, GrpcQueueClient, MulticastQueue};
pub use config::{AppConfig, NodeConfig, ServerConfig};
pub use error::{MulticastError, Result};
pub use pipeline::{MulticastNode, NodeBridge, NodeMessage, PipelineError, PipelineStatus};
pub use types::{Message, Outcome, Payload};
