use anyhow::Context;
use clap::Parser;
use fauxsearch_core::config::BackendConfig;
use fauxsearch_core::SearchService;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "fauxsearch-backend",
    about = "Search backend that answers with fake results after a random delay"
)]
struct Cli {
    /// TOML config file layered over the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:36061.
    #[arg(long)]
    listen: Option<String>,

    /// Identity reported in results. Defaults to the host name.
    #[arg(long)]
    backend_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fauxsearch::logging::init("info");

    let mut config = BackendConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if cli.backend_id.is_some() {
        config.backend_id = cli.backend_id;
    }

    let backend = config.backend_id();
    tracing::info!(%backend, "starting backend");

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to listen on {}", config.listen_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
                shutdown.cancel();
            }
        }
    });

    let service = SearchService::with_timings(backend, config.timings());
    fauxsearch_rpc::server::serve(listener, service, shutdown).await?;
    Ok(())
}
