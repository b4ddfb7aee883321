use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use persona_server::config::ServerConfig;
use persona_server::logging::init_logging;
use persona_server::state::AppState;

#[derive(Parser)]
#[command(name = "persona-server")]
#[command(about = "HTTP API for the persona calendar", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/persona-calendar/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override server.port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config.log)?;

    let state = AppState::from_config(&config).await?;
    let app = persona_server::app(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("persona-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("persona-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
