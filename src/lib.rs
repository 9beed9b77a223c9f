//! Backend API gateway.
//!
//! Forwards every request under a path prefix to a single upstream origin,
//! stripping hop-by-hop headers and streaming bodies in both directions.
//!
//! ```text
//!   caller ──▶ http::server ──▶ routing::resolver ──▶ http::headers
//!                                                         │
//!                                                         ▼
//!   caller ◀── http::response ◀──────────────── upstream::forwarder ──▶ origin
//!          ◀── error (502) ◀─── on failure ───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
