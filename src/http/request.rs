//! Request identification.
//!
//! # Responsibilities
//! - Reuse the caller's `x-request-id`, or mint a UUID v4 when there is none
//! - Carry the id into the request span and every log line
//!
//! # Design Decisions
//! - The id lives in request extensions only; headers sent upstream and
//!   returned to the caller are exactly what the other side sent

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, MakeRequestUuid, RequestId};
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Header carrying the request id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Read the request id from a header map.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Access to the request id of a request.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or_else(|| request_id(self.headers()))
    }
}

/// Middleware recording the request id in extensions, leaving headers untouched.
pub async fn assign_request_id(mut request: Request<Body>) -> Request<Body> {
    let id = match request.headers().get(&X_REQUEST_ID) {
        Some(value) => Some(RequestId::new(value.clone())),
        None => MakeRequestUuid.make_request_id(&request),
    };
    if let Some(id) = id {
        request.extensions_mut().insert(id);
    }
    request
}

/// Span factory for `TraceLayer` that records the request id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            request_id = %request.request_id(),
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}
