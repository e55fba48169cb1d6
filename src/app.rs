//! Host runtime for a single node
//!
//! The node runs on its own thread inside a current-thread tokio runtime and
//! reads one JSON message per line from its input. Results come back to the
//! calling thread through a [`NodeBridge`]:
//!
//! ```text
//! input lines ──► [node thread: tokio, one task per message] ──► NodeBridge ──► host
//! ```
//!
//! Blank lines are ignored. Lines that are not UTF-8 or not JSON messages
//! are logged and skipped. At end of input, or when reading fails, the host
//! waits for in-flight messages, closes the node and sends
//! [`NodeMessage::Closed`].

use crate::backend::{ConnectionProvider, MulticastQueue};
use crate::config::AppConfig;
use crate::error::{MulticastError, Result};
use crate::pipeline::{MulticastNode, NodeBridge, NodeMessage, NodeSender};
use crate::types::Message;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Handle to a running node thread
pub struct NodeHost {
    bridge: NodeBridge,
    handle: JoinHandle<Result<()>>,
}

impl NodeHost {
    /// Start a node that talks to the configured server over gRPC.
    pub fn spawn<R>(config: AppConfig, input: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::spawn_with_queue(config, None, input)
    }

    /// Start a node on the given queue instead of a gRPC channel.
    pub fn spawn_with_queue<R>(
        config: AppConfig,
        queue: Option<Arc<dyn MulticastQueue>>,
        input: R,
    ) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (bridge, sender) = NodeBridge::new();
        let handle = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| MulticastError::Io(e).with_context("Failed to start runtime"))?;
            runtime.block_on(run_node(config, queue, input, sender))
        });
        Self { bridge, handle }
    }

    /// Pass every node message to `f` until the node closes or its thread
    /// exits, then return the thread's result.
    pub fn run_until_closed<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(NodeMessage),
    {
        for msg in self.bridge.receiver().iter() {
            let closed = matches!(msg, NodeMessage::Closed);
            f(msg);
            if closed {
                break;
            }
        }
        self.join()
    }

    /// Wait for the node thread to finish.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| MulticastError::Channel("node thread panicked".to_string()))?
    }
}

async fn run_node<R>(
    config: AppConfig,
    queue: Option<Arc<dyn MulticastQueue>>,
    input: R,
    sender: NodeSender,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let provider = match connect(&config, queue) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Node not started: {}", e);
            return Err(e);
        }
    };
    let node = Arc::new(MulticastNode::new(
        config.node.clone(),
        Some(&provider),
        Arc::new(sender.clone()),
    )?);
    drop(provider);

    let mut tasks = JoinSet::new();
    let read_result = read_messages(input, &node, &sender, &mut tasks).await;

    info!("Input closed, waiting for {} in-flight message(s)", tasks.len());
    while let Some(res) = tasks.join_next().await {
        if let Err(e) = res {
            error!("Message task failed: {}", e);
        }
    }

    match Arc::try_unwrap(node) {
        Ok(node) => node.close(),
        Err(_) => warn!("Node still referenced at shutdown"),
    }
    sender.send_closed();
    read_result
}

/// Spawn one task per message line until end of input or a read error.
///
/// Lines that are not UTF-8 or not a JSON message are logged and skipped.
async fn read_messages<R>(
    input: R,
    node: &Arc<MulticastNode>,
    sender: &NodeSender,
    tasks: &mut JoinSet<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.split(b'\n');
    let mut line_no = 0usize;

    loop {
        let raw = match lines.next_segment().await {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input after line {}: {}", line_no, e);
                return Err(MulticastError::Io(e).with_context("Failed to read input"));
            }
        };
        line_no += 1;

        let text = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping input line {}: not valid UTF-8: {}", line_no, e);
                continue;
            }
        };
        let line = text.trim();
        if line.is_empty() {
            continue;
        }
        let msg = match Message::from_json(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Skipping input line {}: not a JSON message: {}", line_no, e);
                continue;
            }
        };

        let node = Arc::clone(node);
        let tx = sender.clone();
        tasks.spawn(async move {
            let out = node.on_input(msg).await;
            if !tx.send_output(out) {
                warn!("Host is gone, output message dropped");
            }
        });
    }

    debug!("Read {} input line(s)", line_no);
    Ok(())
}

fn connect(
    config: &AppConfig,
    queue: Option<Arc<dyn MulticastQueue>>,
) -> Result<ConnectionProvider> {
    config.validate()?;
    match queue {
        Some(queue) => ConnectionProvider::with_queue(&config.server, queue),
        None => ConnectionProvider::connect(&config.server),
    }
}
