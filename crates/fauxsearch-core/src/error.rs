//! Error types for calls served by [`SearchService`](crate::service::SearchService).

use thiserror::Error;

/// Why a call ended without producing (or finishing delivering) results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The caller aborted the call.
    #[error("call cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before a result was ready.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A Watch emission could not be delivered. Fatal to the session only.
    #[error("send failed: {reason}")]
    SendFailed { reason: String },
}

impl CallError {
    /// True for the two caller-initiated terminations.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CallError::Cancelled | CallError::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_caller_terminations_are_cancellations() {
        assert!(CallError::Cancelled.is_cancellation());
        assert!(CallError::DeadlineExceeded.is_cancellation());
        let send = CallError::SendFailed {
            reason: "receiver dropped".to_string(),
        };
        assert!(!send.is_cancellation());
    }
}
