//! Call context — the cancellation and deadline signal for one call.
//!
//! A [`CallContext`] wraps a [`CancellationToken`] plus an optional deadline.
//! Waiting code races its timer against [`CallContext::done`]; whichever
//! completes first decides the outcome. A deadline is just a cancellation
//! whose cause is [`CallError::DeadlineExceeded`].

use crate::error::CallError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is only done once cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled whenever `parent` is.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            deadline: None,
        }
    }

    /// Bound the context by an absolute deadline. An earlier existing
    /// deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Bound the context by a timeout measured from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The cause if the context is already done, without waiting.
    pub fn err(&self) -> Option<CallError> {
        if self.token.is_cancelled() {
            return Some(CallError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(CallError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or its deadline passes,
    /// yielding the cause.
    pub async fn done(&self) -> CallError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => CallError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => CallError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CallError::Cancelled
            }
        }
    }
}
