//! Backend API gateway binary.
//!
//! Loads configuration, refuses to start without an upstream origin, then
//! serves until SIGINT or SIGTERM.

use std::path::PathBuf;

use clap::Parser;

use backend_gateway::config::LogFormat;
use backend_gateway::lifecycle::signals::forward_signals;
use backend_gateway::lifecycle::startup::{self, Overrides};
use backend_gateway::lifecycle::Shutdown;
use backend_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "backend-gateway")]
#[command(about = "Streams browser requests to a single backend API origin", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream origin (overrides GATEWAY_UPSTREAM_ORIGIN)
    #[arg(short, long)]
    upstream: Option<String>,

    /// Listener bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Path prefix that is forwarded
    #[arg(short, long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        bind_address: cli.bind,
        upstream_origin: cli.upstream,
        prefix: cli.prefix,
    };

    let config = match startup::load(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            init_logging(LogFormat::Pretty);
            tracing::error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    };

    init_logging(config.observability.log_format);
    tracing::info!("backend-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    startup::serve(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
