//! Pooled HTTP client used for every upstream call.

use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;

use crate::config::{ConfigError, UpstreamConfig};

/// Client that speaks plain HTTP or HTTPS depending on the origin scheme.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Install the process-wide rustls crypto provider exactly once.
///
/// Both the upstream connector and the optional TLS listener build rustls
/// configs, so this runs before either of them.
pub fn install_crypto_provider() -> Result<(), ConfigError> {
    static RUSTLS_INIT: OnceLock<bool> = OnceLock::new();
    let installed = RUSTLS_INIT.get_or_init(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .is_ok()
            || rustls::crypto::CryptoProvider::get_default().is_some()
    });
    if *installed {
        Ok(())
    } else {
        Err(ConfigError::HttpClient(
            "failed to install rustls crypto provider".to_string(),
        ))
    }
}

/// Build the upstream client from configuration.
pub fn build_client(config: &UpstreamConfig) -> Result<UpstreamClient, ConfigError> {
    install_crypto_provider()?;

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_nodelay(true);
    http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    let client = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .build(https);

    tracing::debug!(
        connect_timeout_secs = config.connect_timeout_secs,
        pool_idle_timeout_secs = config.pool_idle_timeout_secs,
        "Upstream client built"
    );

    Ok(client)
}
