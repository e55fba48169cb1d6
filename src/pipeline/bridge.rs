//! Boundary between running nodes and the host.
//!
//! Node tasks push [`NodeMessage`]s through a [`NodeSender`]; the host reads
//! them from the [`NodeBridge`] without touching the async runtime.

use crate::pipeline::status::{NodeStatus, StatusSurface};
use crate::types::Message;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default channel capacity
pub const DEFAULT_BRIDGE_CAPACITY: usize = 1024;

/// Messages sent from a node to the host.
#[derive(Debug, Clone)]
pub enum NodeMessage {
    /// The node's status changed.
    Status(NodeStatus),

    /// A processed message, outcome attached.
    Output(Message),

    /// The node has been closed.
    Closed,
}

/// Node-side handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NodeSender {
    tx: Sender<NodeMessage>,
}

impl NodeSender {
    /// Forward a processed message. Blocks only while the host is behind by
    /// a full channel.
    pub fn send_output(&self, msg: Message) -> bool {
        self.tx.send(NodeMessage::Output(msg)).is_ok()
    }

    pub fn send_closed(&self) -> bool {
        self.tx.send(NodeMessage::Closed).is_ok()
    }
}

/// Status updates are best effort: a full channel drops the update.
impl StatusSurface for NodeSender {
    fn publish(&self, status: &NodeStatus) {
        match self.tx.try_send(NodeMessage::Status(status.clone())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Bridge full, dropping status update {:?}", status.text)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("Bridge closed, dropping status update")
            }
        }
    }
}

/// Host-side end of the bridge.
#[derive(Debug)]
pub struct NodeBridge {
    rx: Receiver<NodeMessage>,
}

impl NodeBridge {
    /// Create a bridge with the default capacity.
    pub fn new() -> (Self, NodeSender) {
        Self::with_capacity(DEFAULT_BRIDGE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, NodeSender) {
        let (tx, rx) = bounded(capacity);
        (Self { rx }, NodeSender { tx })
    }

    /// The raw receiver, for `select!`-style hosts.
    pub fn receiver(&self) -> &Receiver<NodeMessage> {
        &self.rx
    }
}
