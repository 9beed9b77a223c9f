//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request id, tracing, concurrency bound)
//!     → routing::resolver (prefix capture, upstream URI)
//!     → headers.rs (strip hop-by-hop headers)
//!     → upstream::forwarder (single outbound call)
//!     → response.rs (strip headers, stream body) or error translation
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;
pub mod tls;

pub use headers::HeaderDenylist;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
