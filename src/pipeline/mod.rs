//! Request pipeline for multicast downlinks.
//!
//! Every message flows through the same stages:
//!
//! ```text
//! Message ──► resolver ──► payload ──► request ──► MulticastQueue
//!                                                       │
//! Message + Outcome ◄── status ◄────────────────────────┘
//! ```
//!
//! - **resolver** - group id and port, with config → message → payload precedence
//! - **payload** - encoding detection and decoding into bytes
//! - **request** - the enqueue request value
//! - **status** - the node's display state machine
//! - **node** - `MulticastNode`, which runs the stages for each message
//! - **bridge** - crossbeam channels carrying node output to the host

pub mod bridge;
pub mod error;
pub mod node;
pub mod payload;
pub mod request;
pub mod resolver;
pub mod status;

pub use bridge::{NodeBridge, NodeMessage, NodeSender, DEFAULT_BRIDGE_CAPACITY};
pub use error::{PipelineError, PipelineResult};
pub use node::MulticastNode;
pub use payload::{normalize, Encoding, NormalizedPayload, RawPayload};
pub use request::QueueRequest;
pub use resolver::{resolve, ResolvedParams};
pub use status::{
    FailureKind, Fill, LogStatusSurface, NodeStatus, PipelineStatus, Shape, StatusReporter,
    StatusSurface,
};
