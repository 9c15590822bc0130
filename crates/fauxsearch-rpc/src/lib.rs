//! fauxsearch-rpc — HTTP transport for the fauxsearch service.
//!
//! [`server`] mounts a [`SearchService`](fauxsearch_core::SearchService) on an
//! axum router; [`client`] calls it over a single hyper HTTP/1 connection.
//! [`wire`] holds what both sides agree on: paths, headers, frames and
//! error statuses.

pub mod client;
pub mod error;
pub mod server;
pub mod wire;

pub use client::{SearchClient, WatchStream};
pub use error::ClientError;
pub use wire::{Code, Status, WatchFrame};
