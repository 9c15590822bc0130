//! fauxsearch-core — simulated search backend core.
//!
//! This crate holds everything with design content: the result generator,
//! the jitter policy, the call context that carries cancellation and
//! deadlines, and the [`SearchService`] that composes them. Transports and
//! binaries only construct and wire these pieces.
//!
//! # Architecture
//!
//! ```text
//! Jitter ──┐
//!          ├──► SearchService ──► (transport) ──► client
//! Results ─┘         ▲
//!                CallContext
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod jitter;
pub mod results;
pub mod service;
pub mod types;

pub use context::CallContext;
pub use error::CallError;
pub use jitter::Jitter;
pub use service::{
    ResultSink, SearchService, ServiceTimings, SessionState, Termination, WatchSession,
};
pub use types::{BackendId, SearchRequest, SearchResult};
