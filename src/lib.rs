//! fauxsearch — simulated search backend and client.
//!
//! Two binaries share this crate:
//!
//! - `fauxsearch-backend` serves Search and Watch with synthetic results
//!   after a jittered delay, tagging every result with its backend identity.
//! - `fauxsearch-client` calls a backend once, either as a unary Search with
//!   a fixed 300 ms timeout or as an open-ended Watch stream.
//!
//! # Architecture
//!
//! ```text
//! fauxsearch-client ──► fauxsearch-rpc::client ──HTTP──► fauxsearch-rpc::server ──► fauxsearch-core::SearchService
//! ```
//!
//! Everything with behavior lives in `fauxsearch-core`; this crate only
//! wires it up and renders results.

pub mod client;
pub mod logging;
