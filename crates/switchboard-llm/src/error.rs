use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to a vendor
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request could not be sent or the connection failed mid-read
    #[error("transport error: {0}")]
    Transport(String),

    /// Caller cancelled the operation
    #[error("request cancelled")]
    Cancelled,

    /// Caller-supplied deadline elapsed
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Vendor answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Vendor refused to generate content
    #[error(transparent)]
    ContentBlocked(#[from] ContentBlockedError),

    /// Reply is structurally invalid for the vendor's format
    #[error("malformed upstream reply: {0}")]
    MalformedResponse(String),

    /// Body is not in any recognized response shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Vendor has no streaming support in this crate
    #[error("streaming not supported by {vendor}")]
    StreamingUnsupported { vendor: String },

    /// Consumer stopped reading the stream
    #[error("stream closed by reader")]
    StreamClosed,

    /// Request could not be built from the given inputs
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// HTTP status reported by the vendor, if any
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(error) => Some(error.status),
            _ => None,
        }
    }

    pub const fn is_content_blocked(&self) -> bool {
        matches!(self, Self::ContentBlocked(_))
    }

    /// Whether the caller ended the operation (cancellation or deadline)
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Non-success HTTP reply
#[derive(Debug, Error)]
#[error("API error (status {status}): {message}")]
pub struct ApiError {
    /// Status code returned by the vendor
    pub status: StatusCode,
    /// Human-readable message, usually the body text
    pub message: String,
    /// Raw reply body
    pub body: Bytes,
}

impl ApiError {
    /// Build from a status and raw body, using the body text as message
    pub fn from_body(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            message: String::from_utf8_lossy(&body).into_owned(),
            body,
        }
    }
}

/// Vendor refused to produce content for safety reasons
#[derive(Debug, Error)]
#[error("content blocked by safety filters (reason: {reason})")]
pub struct ContentBlockedError {
    /// Vendor-supplied reason code (e.g. `SAFETY`)
    pub reason: String,
    /// Raw body or frame that carried the refusal
    pub body: Bytes,
}
