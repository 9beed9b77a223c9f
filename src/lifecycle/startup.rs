//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration (file, then environment, then CLI flags)
//! - Validate it before anything is bound
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::loader::{apply_overrides_from, read_config};
use crate::config::{ConfigError, GatewayConfig, validate_config};
use crate::http::HttpServer;
use crate::http::tls::load_tls_config;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Values supplied on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub upstream_origin: Option<String>,
    pub prefix: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(origin) = &self.upstream_origin {
            config.upstream.origin = Some(origin.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.routing.prefix = prefix.clone();
        }
    }
}

/// Build the effective configuration from the process environment.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<GatewayConfig, ConfigError> {
    load_with(path, overrides, |name| std::env::var(name).ok())
}

/// Build the effective configuration using an arbitrary environment lookup.
pub fn load_with<F>(
    path: Option<&Path>,
    overrides: &Overrides,
    lookup: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_overrides_from(&mut config, lookup)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn serve(
    config: GatewayConfig,
    shutdown: &Shutdown,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        connect_timeout_secs = config.upstream.connect_timeout_secs,
        response_timeout_secs = config.upstream.response_timeout_secs,
        "Configuration loaded"
    );

    let listener_config = config.listener.clone();
    let observability = config.observability.clone();
    let server = HttpServer::new(config)?;

    if observability.metrics_enabled {
        let addr: SocketAddr = observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let bind_address: SocketAddr = listener_config.bind_address.parse()?;
    match &listener_config.tls {
        Some(tls) => {
            let tls_config = load_tls_config(tls).await?;
            server
                .run_tls(bind_address, tls_config, shutdown.subscribe())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    Ok(())
}
