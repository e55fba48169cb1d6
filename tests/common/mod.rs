//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use chirpstack_multicast::pipeline::{NodeStatus, StatusSurface};
use std::sync::Mutex;

/// Status surface that remembers everything published to it
#[derive(Debug, Default)]
pub struct RecordingSurface {
    statuses: Mutex<Vec<NodeStatus>>,
}

impl RecordingSurface {
    pub fn statuses(&self) -> Vec<NodeStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.statuses().into_iter().map(|s| s.text).collect()
    }
}

impl StatusSurface for RecordingSurface {
    fn publish(&self, status: &NodeStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }
}
