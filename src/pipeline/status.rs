//! Node status state machine and display surface.
//!
//! ```text
//! Idle ──► Sending ──► Succeeded ──(reset delay)──► Idle
//!             │
//!             └──────► Failed (kept until the next message)
//! ```
//!
//! The reporter is the only writer. Every change is pushed to a
//! [`StatusSurface`] as a [`NodeStatus`] (fill colour, shape, text).

use crate::pipeline::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Status fill colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    Red,
    Green,
    Yellow,
    Blue,
    Grey,
}

/// Status indicator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Ring,
    Dot,
}

/// What the display slot shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub fill: Fill,
    pub shape: Shape,
    pub text: String,
}

impl NodeStatus {
    pub fn new(fill: Fill, shape: Shape, text: impl Into<String>) -> Self {
        Self {
            fill,
            shape,
            text: text.into(),
        }
    }
}

/// Why the last message failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MissingGroupId,
    InvalidFormat,
    Conversion,
    Remote { code: i32 },
}

impl From<&PipelineError> for FailureKind {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::MissingParameter(_) => FailureKind::MissingGroupId,
            PipelineError::UnsupportedPayloadFormat(_) => FailureKind::InvalidFormat,
            PipelineError::PayloadDecode(_) => FailureKind::Conversion,
            PipelineError::Remote(e) => FailureKind::Remote { code: e.code },
        }
    }
}

/// Progress of the node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineStatus {
    #[default]
    Idle,
    Sending,
    Succeeded { f_cnt: u32 },
    Failed(FailureKind),
}

impl PipelineStatus {
    /// Rendering for the display slot
    pub fn to_node_status(&self) -> NodeStatus {
        match self {
            PipelineStatus::Idle => NodeStatus::new(Fill::Grey, Shape::Ring, "ready"),
            PipelineStatus::Sending => NodeStatus::new(Fill::Blue, Shape::Dot, "sending..."),
            PipelineStatus::Succeeded { f_cnt } => {
                NodeStatus::new(Fill::Green, Shape::Dot, format!("sent (fCnt: {})", f_cnt))
            }
            PipelineStatus::Failed(kind) => {
                let text = match kind {
                    FailureKind::MissingGroupId => "missing ID".to_string(),
                    FailureKind::InvalidFormat => "invalid format".to_string(),
                    FailureKind::Conversion => "conversion error".to_string(),
                    FailureKind::Remote { code } => format!("error: {}", code),
                };
                NodeStatus::new(Fill::Red, Shape::Ring, text)
            }
        }
    }
}

/// Display slot that shows a node's status
pub trait StatusSurface: Send + Sync {
    fn publish(&self, status: &NodeStatus);
}

/// Surface that writes status changes to the log
#[derive(Debug, Default, Clone)]
pub struct LogStatusSurface {
    name: String,
}

impl LogStatusSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl StatusSurface for LogStatusSurface {
    fn publish(&self, status: &NodeStatus) {
        tracing::info!(
            node = %self.name,
            fill = ?status.fill,
            shape = ?status.shape,
            "status: {}",
            status.text
        );
    }
}

#[derive(Debug)]
struct StatusState {
    status: PipelineStatus,
    generation: u64,
}

/// Owner of a node's status
///
/// Each published change bumps a generation counter. A scheduled reset only
/// applies if nothing was published after it was scheduled.
pub struct StatusReporter {
    surface: Arc<dyn StatusSurface>,
    state: Mutex<StatusState>,
    reset_delay: Duration,
}

impl StatusReporter {
    /// Create a reporter and publish the initial idle status
    pub fn new(surface: Arc<dyn StatusSurface>, reset_delay: Duration) -> Arc<Self> {
        let reporter = Arc::new(Self {
            surface,
            state: Mutex::new(StatusState {
                status: PipelineStatus::Idle,
                generation: 0,
            }),
            reset_delay,
        });
        reporter
            .surface
            .publish(&PipelineStatus::Idle.to_node_status());
        reporter
    }

    pub fn current(&self) -> PipelineStatus {
        self.lock().status.clone()
    }

    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    /// Publish a new status; returns its generation
    pub fn set(&self, status: PipelineStatus) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        self.surface.publish(&status.to_node_status());
        state.status = status;
        state.generation
    }

    /// Return to idle after the reset delay, unless another status is
    /// published first. Never cancelled; needs a tokio runtime.
    pub fn schedule_reset(self: &Arc<Self>) {
        let generation = self.lock().generation;
        let reporter = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(reporter.reset_delay).await;
            reporter.reset_if_current(generation);
        });
    }

    /// Reset to idle if `generation` is still the latest. Returns whether it did.
    pub fn reset_if_current(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::trace!(
                "Skipping status reset: generation {} superseded by {}",
                generation,
                state.generation
            );
            return false;
        }
        state.generation += 1;
        state.status = PipelineStatus::Idle;
        self.surface
            .publish(&PipelineStatus::Idle.to_node_status());
        true
    }

    fn lock(&self) -> MutexGuard<'_, StatusState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("status", &self.current())
            .field("reset_delay", &self.reset_delay)
            .finish()
    }
}
