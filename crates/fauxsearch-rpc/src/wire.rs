//! Wire format shared by the server and the client.
//!
//! Both operations are `POST` requests with a JSON [`SearchRequest`] body.
//! Search answers with a JSON [`SearchResult`]; Watch answers with
//! newline-delimited JSON [`WatchFrame`]s. Failed calls carry a [`Status`].
//!
//! A caller's deadline travels in the [`TIMEOUT_HEADER`] as whole
//! milliseconds remaining.
//!
//! [`SearchRequest`]: fauxsearch_core::SearchRequest

use bytes::Bytes;
use fauxsearch_core::{CallError, SearchResult};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SEARCH_PATH: &str = "/v1/search";
pub const WATCH_PATH: &str = "/v1/watch";

/// Remaining caller deadline in milliseconds.
pub const TIMEOUT_HEADER: &str = "x-fauxsearch-timeout-ms";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Non-standard "client closed request" status, used for cancelled calls.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Error category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    Cancelled,
    DeadlineExceeded,
    InvalidArgument,
    Unavailable,
    Internal,
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Code::Cancelled => write!(f, "cancelled"),
            Code::DeadlineExceeded => write!(f, "deadline exceeded"),
            Code::InvalidArgument => write!(f, "invalid argument"),
            Code::Unavailable => write!(f, "unavailable"),
            Code::Internal => write!(f, "internal"),
        }
    }
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::Cancelled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Best-effort category for a response without a [`Status`] body.
    pub fn from_http_status(status: StatusCode) -> Self {
        match status.as_u16() {
            CLIENT_CLOSED_REQUEST => Code::Cancelled,
            504 => Code::DeadlineExceeded,
            503 => Code::Unavailable,
            400..=499 => Code::InvalidArgument,
            _ => Code::Internal,
        }
    }
}

/// A failed call as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Decode an error response, falling back to the HTTP status and raw
    /// body text when the body is not a [`Status`].
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| {
            Status::new(
                Code::from_http_status(status),
                String::from_utf8_lossy(body).trim().to_string(),
            )
        })
    }
}

impl From<&CallError> for Status {
    fn from(err: &CallError) -> Self {
        let code = match err {
            CallError::Cancelled => Code::Cancelled,
            CallError::DeadlineExceeded => Code::DeadlineExceeded,
            CallError::SendFailed { .. } => Code::Unavailable,
        };
        Status::new(code, err.to_string())
    }
}

/// One line of a Watch response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchFrame {
    Result(SearchResult),
    /// Terminal frame; nothing follows it.
    Error(Status),
}

impl From<SearchResult> for WatchFrame {
    fn from(result: SearchResult) -> Self {
        WatchFrame::Result(result)
    }
}

impl WatchFrame {
    /// Encode as one NDJSON line, trailing newline included.
    pub fn to_line(&self) -> Result<Bytes, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(Bytes::from(line))
    }
}

pub fn encode_timeout(remaining: Duration) -> String {
    remaining.as_millis().to_string()
}

pub fn decode_timeout(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
