//! Search service — the unary `Search` and streaming `Watch` operations.
//!
//! Both operations sleep for a jittered delay and race that sleep against the
//! caller's [`CallContext`]. The content of a result never depends on the
//! delay; only its arrival time does.
//!
//! # Watch sessions
//!
//! A Watch call is a [`WatchSession`] that alternates between waiting and
//! emitting until it terminates:
//!
//! ```text
//! Idle ──► Waiting ──► Emitting ──► Waiting ──► … ──► Terminated
//!              │                        │
//!              └──── context done ──────┴──► Terminated(Cancelled | DeadlineExceeded)
//! ```
//!
//! The session never ends on its own unless a `max_emissions` bound is
//! configured; otherwise only the caller (cancellation, deadline) or the
//! transport (send failure) ends it.

use crate::context::CallContext;
use crate::error::CallError;
use crate::jitter::Jitter;
use crate::results;
use crate::types::{BackendId, SearchRequest, SearchResult};
use futures::Stream;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default upper bound of the Search delay.
pub const SEARCH_MAX_DELAY: Duration = Duration::from_millis(100);

/// Default upper bound of each Watch inter-emission delay.
pub const WATCH_MAX_DELAY: Duration = Duration::from_secs(1);

/// Delay bounds and limits applied by a [`SearchService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimings {
    pub search_max_delay: Duration,
    pub watch_max_delay: Duration,
    /// End Watch sessions cleanly after this many emissions. `None` keeps
    /// them running until the caller goes away.
    pub watch_max_emissions: Option<u64>,
}

impl Default for ServiceTimings {
    fn default() -> Self {
        Self {
            search_max_delay: SEARCH_MAX_DELAY,
            watch_max_delay: WATCH_MAX_DELAY,
            watch_max_emissions: None,
        }
    }
}

/// Destination for Watch emissions, usually the transport's response stream.
pub trait ResultSink: Send {
    /// Deliver one result. An error ends the session with that error.
    fn send(&mut self, result: SearchResult) -> impl Future<Output = Result<(), CallError>> + Send;
}

impl<T> ResultSink for mpsc::Sender<T>
where
    T: From<SearchResult> + Send,
{
    async fn send(&mut self, result: SearchResult) -> Result<(), CallError> {
        mpsc::Sender::send(self, T::from(result))
            .await
            .map_err(|_| CallError::SendFailed {
                reason: "receiver dropped".to_string(),
            })
    }
}

/// The simulated search backend. Cheap to clone; clones share the backend
/// identity and nothing else.
#[derive(Debug, Clone)]
pub struct SearchService {
    backend: BackendId,
    search_jitter: Jitter,
    watch_jitter: Jitter,
    watch_max_emissions: Option<u64>,
}

impl SearchService {
    pub fn new(backend: BackendId) -> Self {
        Self::with_timings(backend, ServiceTimings::default())
    }

    pub fn with_timings(backend: BackendId, timings: ServiceTimings) -> Self {
        Self {
            backend,
            search_jitter: Jitter::new(timings.search_max_delay),
            watch_jitter: Jitter::new(timings.watch_max_delay),
            watch_max_emissions: timings.watch_max_emissions,
        }
    }

    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    /// Answer one query after a delay of up to the search bound.
    ///
    /// Fails with the context's cause if it is cancelled or its deadline
    /// passes first; no result is produced in that case.
    #[tracing::instrument(name = "search", skip_all, fields(query = %request.query))]
    pub async fn search(
        &self,
        request: &SearchRequest,
        ctx: &CallContext,
    ) -> Result<SearchResult, CallError> {
        let delay = self.search_jitter.sample();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "sleeping");

        let outcome = tokio::select! {
            biased;
            cause = ctx.done() => Err(cause),
            _ = tokio::time::sleep(delay) => Ok(()),
        };
        outcome?;
        Ok(results::unary(&request.query, &self.backend))
    }

    /// Start a Watch session for `request`, bound to `ctx`.
    pub fn session(&self, request: SearchRequest, ctx: CallContext) -> WatchSession {
        WatchSession {
            backend: self.backend.clone(),
            jitter: self.watch_jitter,
            max_emissions: self.watch_max_emissions,
            query: request.query,
            ctx,
            next_index: 0,
            state: SessionState::Idle,
        }
    }

    /// Watch as a lazy stream: `Ok` per emission, then at most one `Err`
    /// carrying the termination cause, then the end of the stream.
    pub fn watch_stream(
        &self,
        request: SearchRequest,
        ctx: CallContext,
    ) -> impl Stream<Item = Result<SearchResult, CallError>> + Send + 'static {
        futures::stream::unfold(self.session(request, ctx), |mut session| async move {
            let item = session.next().await?;
            Some((item, session))
        })
    }

    /// Run a Watch session, pushing every emission into `sink`.
    ///
    /// Returns the number of emissions when the session completes cleanly,
    /// which only happens when `max_emissions` is configured.
    #[tracing::instrument(name = "watch", skip_all, fields(query = %request.query))]
    pub async fn watch<S: ResultSink>(
        &self,
        request: SearchRequest,
        ctx: CallContext,
        sink: &mut S,
    ) -> Result<u64, CallError> {
        let mut session = self.session(request, ctx);
        while let Some(item) = session.next().await {
            let result = item?;
            if let Err(e) = sink.send(result).await {
                session.terminate(Termination::Failed(e.clone()));
                return Err(e);
            }
        }
        Ok(session.emitted())
    }
}

/// Where a [`WatchSession`] is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Waiting,
    Emitting,
    Terminated(Termination),
}

/// How a [`WatchSession`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The configured emission bound was reached.
    Completed,
    Failed(CallError),
}

/// State of one Watch call.
#[derive(Debug)]
pub struct WatchSession {
    backend: BackendId,
    jitter: Jitter,
    max_emissions: Option<u64>,
    query: String,
    ctx: CallContext,
    next_index: u64,
    state: SessionState,
}

impl WatchSession {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of results emitted so far.
    pub fn emitted(&self) -> u64 {
        self.next_index
    }

    /// Wait for the next emission.
    ///
    /// Returns `None` once the session has terminated. The call that
    /// terminates it because the context fired returns `Some(Err(cause))`.
    pub async fn next(&mut self) -> Option<Result<SearchResult, CallError>> {
        if matches!(self.state, SessionState::Terminated(_)) {
            return None;
        }
        if self.max_emissions.is_some_and(|max| self.next_index >= max) {
            tracing::debug!(emitted = self.next_index, "watch: emission bound reached");
            self.terminate(Termination::Completed);
            return None;
        }

        let delay = self.jitter.sample();
        self.state = SessionState::Waiting;
        tracing::debug!(
            index = self.next_index,
            delay_ms = delay.as_millis() as u64,
            "sleeping"
        );

        let outcome = tokio::select! {
            biased;
            cause = self.ctx.done() => Err(cause),
            _ = tokio::time::sleep(delay) => Ok(()),
        };
        if let Err(cause) = outcome {
            self.terminate(Termination::Failed(cause.clone()));
            return Some(Err(cause));
        }

        self.state = SessionState::Emitting;
        let result = results::streamed(self.next_index, &self.query, &self.backend);
        self.next_index += 1;
        Some(Ok(result))
    }

    fn terminate(&mut self, termination: Termination) {
        tracing::debug!(emitted = self.next_index, ?termination, "watch: terminated");
        self.state = SessionState::Terminated(termination);
    }
}
