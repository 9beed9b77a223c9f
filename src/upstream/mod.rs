//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! resolved URI + filtered headers + inbound body
//!     → forwarder.rs (ForwardedRequest: GET/HEAD body rule)
//!     → client.rs (pooled hyper client, HTTP or HTTPS)
//!     → resilience::timeouts (optional bound on response headers)
//!     → UpstreamResponse (status, headers, streaming body)
//! ```
//!
//! # Design Decisions
//! - Exactly one origin; no load balancing or retries
//! - Redirects are never followed: hyper's client has no redirect logic
//! - Bodies are streamed in both directions; nothing is buffered

pub mod client;
pub mod forwarder;

pub use client::{UpstreamClient, build_client};
pub use forwarder::{ForwardedRequest, Forwarder, UpstreamResponse, carries_body};
