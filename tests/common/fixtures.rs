//! Timing presets and addresses shared across harnesses.

use fauxsearch_core::ServiceTimings;
use std::time::Duration;

/// Default search delay (≤ 100ms) with a Watch fast enough for real-time tests.
pub fn fast_timings() -> ServiceTimings {
    ServiceTimings {
        watch_max_delay: Duration::from_millis(50),
        ..ServiceTimings::default()
    }
}

/// Like [`fast_timings`], but Watch sessions end cleanly after `n` results.
pub fn bounded_watch(n: u64) -> ServiceTimings {
    ServiceTimings {
        watch_max_emissions: Some(n),
        ..fast_timings()
    }
}

/// Search delays of 1–10s: far beyond the client's 300ms timeout. Stands in
/// for latency injected between client and backend.
pub fn slow_search() -> ServiceTimings {
    ServiceTimings {
        search_max_delay: Duration::from_secs(10),
        ..fast_timings()
    }
}

/// An address nothing is listening on.
pub fn closed_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}
