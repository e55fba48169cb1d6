//! MulticastQueue trait for the enqueue RPC
//!
//! This module provides the seam between the node and the remote service,
//! so the gRPC client and test doubles are interchangeable.

use crate::error::{MulticastError, Result};
use crate::pipeline::QueueRequest;
use async_trait::async_trait;
use tonic::metadata::AsciiMetadataValue;

/// Metadata key carrying the credential
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Pre-built `authorization: Bearer <token>` header value
#[derive(Clone)]
pub struct AuthMetadata {
    value: AsciiMetadataValue,
}

impl AuthMetadata {
    /// Build the header for a token. Fails if the token is empty or is not
    /// a valid header value.
    pub fn bearer(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(MulticastError::Config("API token is empty".to_string()));
        }
        let value = AsciiMetadataValue::try_from(format!("Bearer {}", token)).map_err(|_| {
            MulticastError::Config("API token contains invalid header characters".to_string())
        })?;
        Ok(Self { value })
    }

    pub fn value(&self) -> &AsciiMetadataValue {
        &self.value
    }

    /// The header value as text
    pub fn as_str(&self) -> &str {
        self.value.to_str().unwrap_or_default()
    }
}

impl std::fmt::Debug for AuthMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthMetadata(Bearer <redacted>)")
    }
}

/// Successful enqueue response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueResponse {
    /// Frame counter assigned to the queued downlink
    pub f_cnt: u32,
}

/// Error reported by the remote service or the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub message: String,
    /// gRPC status code
    pub code: i32,
    pub details: Option<String>,
}

impl RemoteError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl From<tonic::Status> for RemoteError {
    fn from(status: tonic::Status) -> Self {
        let details = if status.details().is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(status.details()).into_owned())
        };
        Self {
            message: status.message().to_string(),
            code: status.code() as i32,
            details,
        }
    }
}

/// Remote multicast queue
///
/// One call per request, no streaming. Implementations must be shareable
/// across tasks; the node never mutates them.
///
/// # Example
///
/// ```ignore
/// async fn send(queue: &dyn MulticastQueue, req: QueueRequest, auth: &AuthMetadata) {
///     match queue.enqueue(req, auth).await {
///         Ok(resp) => println!("queued as fCnt {}", resp.f_cnt),
///         Err(e) => eprintln!("enqueue failed: {}", e),
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MulticastQueue: Send + Sync {
    /// Enqueue one downlink for a multicast group
    async fn enqueue(
        &self,
        request: QueueRequest,
        auth: &AuthMetadata,
    ) -> std::result::Result<EnqueueResponse, RemoteError>;
}
