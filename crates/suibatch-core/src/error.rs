use std::time::Duration;

use reqwest::StatusCode;

use crate::rpc::RequestId;

// ==============================================================================
// Batch-Level Errors
// ==============================================================================

/// Failures that abort a whole round trip. No per-call outcomes are
/// produced when one of these is returned, since the client cannot know
/// which calls of the batch the node actually processed.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("node answered with HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed JSON-RPC response: {0}")]
    MalformedResponse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("request id space exhausted: cannot reserve {count} more ids")]
    IdsExhausted { count: u64 },

    #[error("encode JSON-RPC request: {0}")]
    Encode(serde_json::Error),
}

impl RpcError {
    /// Whether the caller may reasonably resend the same logical calls.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::MalformedResponse(_)
            | Self::Cancelled
            | Self::IdsExhausted { .. }
            | Self::Encode(_) => false,
        }
    }
}

// ==============================================================================
// Per-Call Errors
// ==============================================================================

/// Failure of one logical call inside a batch. Sibling calls are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("non-standard JSON-RPC error: {0}")]
    NonStandard(String),

    #[error("no response for request id {id}")]
    MissingResponse { id: RequestId },

    #[error("decode {method} result: {message}")]
    Decode { method: String, message: String },
}

impl CallError {
    pub(crate) fn decode(method: &str, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            method: method.to_owned(),
            message: message.to_string(),
        }
    }
}

// ==============================================================================
// Top-Level Error
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("insufficient balance: no coin holds at least {requested}")]
    InsufficientBalance { requested: u64 },

    #[error("invalid call to {method}: {message}")]
    InvalidCall { method: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
