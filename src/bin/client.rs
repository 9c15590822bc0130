//! Issues one call to a fauxsearch backend and prints the results.
//!
//! In `search` mode the client calls Search and prints the result; in
//! `watch` mode it starts a Watch and prints the result stream.

use clap::Parser;
use fauxsearch::client::{run_search, run_watch, Mode};
use fauxsearch_core::CallContext;
use fauxsearch_rpc::SearchClient;

#[derive(Parser)]
#[command(name = "fauxsearch-client", about = "Call a fauxsearch backend and print the results")]
struct Cli {
    /// Backend address (host:port).
    #[arg(long, default_value = "localhost:36061")]
    server: String,

    #[arg(long, value_enum, default_value_t = Mode::Search)]
    mode: Mode,

    /// Query string.
    #[arg(long, default_value = "test")]
    query: String,

    /// Log debug output to stderr.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fauxsearch::logging::init(if cli.verbose { "debug" } else { "warn" });

    let mut client = SearchClient::connect(&cli.server).await?;
    tracing::debug!(server = %cli.server, mode = %cli.mode, "connected");

    let mut out = std::io::stdout().lock();
    match cli.mode {
        Mode::Search => run_search(&mut client, &cli.query, &mut out).await?,
        Mode::Watch => {
            run_watch(&mut client, &cli.query, CallContext::new(), &mut out).await?;
        }
    }
    Ok(())
}
