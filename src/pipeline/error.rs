//! Errors raised while handling a single message.

use crate::backend::RemoteError;
use crate::types::{ErrorCode, ErrorInfo};
use thiserror::Error;

/// Per-message failures. All of them are turned into a failure outcome on the
/// outgoing message; none stops the node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unsupported payload format: {0}")]
    UnsupportedPayloadFormat(String),

    #[error("Payload decode error: {0}")]
    PayloadDecode(String),

    #[error("Remote service error: {0}")]
    Remote(RemoteError),
}

impl PipelineError {
    /// Code attached to the outgoing message
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::MissingParameter(_) => ErrorCode::Local("MISSING_PARAMETER".into()),
            PipelineError::UnsupportedPayloadFormat(_) => {
                ErrorCode::Local("UNSUPPORTED_PAYLOAD_FORMAT".into())
            }
            PipelineError::PayloadDecode(_) => ErrorCode::Local("PAYLOAD_DECODE_ERROR".into()),
            PipelineError::Remote(e) => ErrorCode::Grpc(e.code),
        }
    }

    /// Failure detail for the outgoing message. Remote errors keep the
    /// server's message and details verbatim.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            PipelineError::Remote(e) => ErrorInfo {
                message: e.message.clone(),
                code: self.code(),
                details: e.details.clone(),
            },
            other => ErrorInfo {
                message: other.to_string(),
                code: other.code(),
                details: None,
            },
        }
    }
}

impl From<RemoteError> for PipelineError {
    fn from(err: RemoteError) -> Self {
        PipelineError::Remote(err)
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
