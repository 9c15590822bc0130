//! Error types for the fauxsearch client.

use crate::wire::{Code, Status};
use fauxsearch_core::CallError;
use thiserror::Error;

/// Errors a [`SearchClient`](crate::client::SearchClient) call can end with.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connect or HTTP handshake failed.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server answered with an error.
    #[error("rpc error: {0}")]
    Status(Status),

    /// The local call context was cancelled or its deadline passed.
    #[error(transparent)]
    Call(#[from] CallError),

    /// HTTP protocol or connection error.
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The watch body ended in the middle of a frame.
    #[error("stream ended mid-frame")]
    Truncated,
}

impl ClientError {
    /// The call's error category, whether it was decided locally or by the
    /// server. `None` for transport and codec failures.
    pub fn code(&self) -> Option<Code> {
        match self {
            ClientError::Status(status) => Some(status.code),
            ClientError::Call(CallError::Cancelled) => Some(Code::Cancelled),
            ClientError::Call(CallError::DeadlineExceeded) => Some(Code::DeadlineExceeded),
            ClientError::Call(CallError::SendFailed { .. }) => Some(Code::Unavailable),
            _ => None,
        }
    }
}
