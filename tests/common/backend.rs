//! In-process fauxsearch backend for integration tests.
//!
//! Binds an axum server to a random TCP port on 127.0.0.1 and serves a
//! [`SearchService`] with the given identity and timings. The server shuts
//! down when the handle is dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use common::backend::TestBackend;
//!
//! let backend = TestBackend::start("be-1", fast_timings()).await.unwrap();
//! let mut client = backend.connect().await;
//! # });
//! ```

use fauxsearch_core::{BackendId, SearchService, ServiceTimings};
use fauxsearch_rpc::SearchClient;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Handle to a running test backend.
pub struct TestBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl TestBackend {
    /// Start a backend on a random port. Returns once the port is bound.
    pub async fn start(id: &str, timings: ServiceTimings) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();

        let service = SearchService::with_timings(BackendId::new(id), timings);
        tokio::spawn(fauxsearch_rpc::server::serve(
            listener,
            service,
            shutdown.clone(),
        ));

        Ok(Self { addr, shutdown })
    }

    /// `host:port` to hand to the client.
    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    /// Open a fresh client connection. Panics if the backend is unreachable.
    pub async fn connect(&self) -> SearchClient {
        SearchClient::connect(&self.addr())
            .await
            .expect("test backend must accept connections")
    }

    /// Cancel every in-flight call and stop accepting connections.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// The root token, for shutting the backend down from another task.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Tasks alive on the current runtime.
pub fn alive_tasks() -> usize {
    tokio::runtime::Handle::current().metrics().num_alive_tasks()
}

/// Poll until at most `limit` tasks are alive or `within` elapses. Returns
/// the last count seen.
pub async fn settle_tasks(limit: usize, within: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let alive = alive_tasks();
        if alive <= limit || tokio::time::Instant::now() >= deadline {
            return alive;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
