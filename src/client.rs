//! Client modes — what `fauxsearch-client` does once connected.
//!
//! Search mode bounds the call by [`SEARCH_TIMEOUT`]; Watch mode runs until
//! the backend ends the stream or an error arrives. Neither mode retries.

use anyhow::Context;
use fauxsearch_core::{CallContext, SearchRequest};
use fauxsearch_rpc::SearchClient;
use std::io::Write;
use std::time::Duration;

/// Timeout imposed on every unary Search call.
pub const SEARCH_TIMEOUT: Duration = Duration::from_millis(300);

/// Printed when the backend ends a Watch stream cleanly.
pub const WATCH_ENDED: &str = "and now your watch is ended";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// One request, one result.
    Search,
    /// Stream results until the backend stops.
    Watch,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Search => write!(f, "search"),
            Mode::Watch => write!(f, "watch"),
        }
    }
}

/// Issue one Search for `query` and print the result.
pub async fn run_search<W: Write>(
    client: &mut SearchClient,
    query: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let ctx = CallContext::new().with_timeout(SEARCH_TIMEOUT);
    let result = client
        .search(&SearchRequest::new(query), &ctx)
        .await
        .with_context(|| format!("search for {query:?} failed"))?;
    writeln!(out, "{result}")?;
    Ok(())
}

/// Watch `query`, printing every result until the stream ends. Returns the
/// number of results received.
pub async fn run_watch<W: Write>(
    client: &mut SearchClient,
    query: &str,
    ctx: CallContext,
    out: &mut W,
) -> anyhow::Result<u64> {
    let mut stream = client
        .watch(&SearchRequest::new(query), ctx)
        .await
        .with_context(|| format!("watch for {query:?} failed"))?;

    let mut received = 0;
    loop {
        let message = stream
            .message()
            .await
            .with_context(|| format!("watch for {query:?} failed after {received} results"))?;
        match message {
            Some(result) => {
                writeln!(out, "{result}")?;
                out.flush()?;
                received += 1;
            }
            None => {
                writeln!(out, "{WATCH_ENDED}")?;
                return Ok(received);
            }
        }
    }
}
