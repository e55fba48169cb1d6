//! Scripted queue for driving a node without a server

use async_trait::async_trait;
use chirpstack_multicast::backend::{AuthMetadata, EnqueueResponse, MulticastQueue, RemoteError};
use chirpstack_multicast::pipeline::QueueRequest;
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the queue saw for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub multicast_group_id: String,
    pub f_port: u32,
    pub data: Vec<u8>,
    pub authorization: String,
}

/// Queue that answers from a script and records every request.
///
/// Once the script runs out every call succeeds with an incrementing fCnt
/// starting at 1.
#[derive(Debug, Default)]
pub struct ScriptedQueue {
    script: Mutex<VecDeque<Result<EnqueueResponse, RemoteError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<EnqueueResponse, RemoteError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn succeed_with(self, f_cnt: u32) -> Self {
        self.respond(Ok(EnqueueResponse { f_cnt }))
    }

    pub fn fail_with(self, code: i32, message: &str) -> Self {
        self.respond(Err(RemoteError::new(code, message)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MulticastQueue for ScriptedQueue {
    async fn enqueue(
        &self,
        request: QueueRequest,
        auth: &AuthMetadata,
    ) -> Result<EnqueueResponse, RemoteError> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                multicast_group_id: request.multicast_group_id().to_string(),
                f_port: request.f_port(),
                data: request.data().as_bytes().to_vec(),
                authorization: auth.as_str().to_string(),
            });
            calls.len() as u32
        };
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(EnqueueResponse { f_cnt: call_no }))
    }
}
