//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the gateway prefix
//! - Wire up middleware (request id, tracing, concurrency bound)
//! - Bind server to listener (plain or TLS)
//! - Forward requests to the upstream origin and relay the reply

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    middleware::map_request,
    routing::{MethodFilter, on},
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, GatewayConfig, UpstreamOrigin, validate_config};
use crate::http::headers::HeaderDenylist;
use crate::http::request::{RequestIdExt, RequestSpan, assign_request_id};
use crate::http::response::stream_response;
use crate::observability::metrics;
use crate::resilience::timeouts;
use crate::routing::PathResolver;
use crate::upstream::{ForwardedRequest, Forwarder, build_client};

/// How long TLS connections get to finish after shutdown is signalled.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(30);

/// Methods accepted under the gateway prefix.
pub const FORWARDED_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::HEAD)
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::OPTIONS);

/// Application state injected into handlers.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PathResolver>,
    pub denylist: Arc<HeaderDenylist>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the configuration is invalid, in particular when no usable
    /// upstream origin is set.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let origin = UpstreamOrigin::parse(config.upstream.origin.as_deref().unwrap_or_default())
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        let resolver = PathResolver::new(origin, config.routing.prefix.clone());

        let client = build_client(&config.upstream)?;
        let forwarder = Forwarder::new(
            client,
            timeouts::from_secs(config.upstream.response_timeout_secs),
        );

        let state = AppState {
            resolver: Arc::new(resolver),
            denylist: Arc::new(HeaderDenylist::hop_by_hop()),
            forwarder: Arc::new(forwarder),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let prefix = config.routing.prefix.as_str();
        Router::new()
            .route(prefix, on(FORWARDED_METHODS, gateway_handler))
            .route(&format!("{prefix}/{{*path}}"), on(FORWARDED_METHODS, gateway_handler))
            .with_state(state)
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
            .layer(map_request(assign_request_id))
    }

    /// The fully layered router, for serving through other transports.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin.as_deref().unwrap_or_default(),
            prefix = %self.config.routing.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin.as_deref().unwrap_or_default(),
            prefix = %self.config.routing.prefix,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Draining in-flight requests");
            signal_handle.graceful_shutdown(Some(TLS_DRAIN_GRACE));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
/// Resolves the upstream URI, strips hop-by-hop headers, forwards once and
/// relays the reply.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();

    // 1. Resolve
    let target = match state.resolver.resolve_uri(request.uri()) {
        Some(Ok(uri)) => uri,
        Some(Err(e)) => {
            tracing::warn!(request_id = %request_id, error = %e, "Could not build upstream URI");
            metrics::record_upstream_error(e.kind());
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), start_time);
            return e.into_response();
        }
        None => {
            metrics::record_request(&method, StatusCode::NOT_FOUND.as_u16(), start_time);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    // 2. Sanitize
    let (parts, body) = request.into_parts();
    let headers = state.denylist.filter(&parts.headers);
    let forwarded = ForwardedRequest::new(method.clone(), target, headers, body);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        upstream = %forwarded.uri,
        with_body = forwarded.has_body(),
        "Forwarding request"
    );

    // 3. Forward
    match state.forwarder.forward(forwarded).await {
        Ok(upstream) => {
            let status = upstream.status;
            tracing::debug!(request_id = %request_id, status = %status, "Upstream responded");
            metrics::record_request(&method, status.as_u16(), start_time);

            // 4. Stream
            stream_response(upstream, &method, &state.denylist, request_id)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error_kind = e.kind(),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(e.kind());
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), start_time);
            e.into_response()
        }
    }
}
