//! Response handling and transformation.
//!
//! # Responsibilities
//! - Copy the upstream status code verbatim (3xx included)
//! - Strip hop-by-hop headers from the upstream response
//! - Stream the upstream body to the caller as chunks arrive
//! - Abort the caller's stream when the upstream body fails
//!
//! # Design Decisions
//! - The body is polled only when the caller's connection can take more,
//!   so a slow caller slows the upstream read instead of growing a buffer
//! - A read failure after the status line is sent cannot become a new
//!   response; it is surfaced as a body error, which makes hyper reset the
//!   connection (the caller sees a truncated response)
//! - Dropping the body (caller went away) drops the upstream connection
//! - A HEAD reply reports no exact size, so no `Content-Length` is invented
//!   for a body that was never sent

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::Method;
use axum::response::Response;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use hyper::body::Incoming;

use crate::error::GatewayError;
use crate::http::headers::HeaderDenylist;
use crate::observability::metrics;
use crate::upstream::UpstreamResponse;

/// Build the caller-facing response from an upstream reply.
pub fn stream_response(
    upstream: UpstreamResponse,
    method: &Method,
    denylist: &HeaderDenylist,
    request_id: impl Into<String>,
) -> Response {
    let headers = denylist.filter(&upstream.headers);
    let mut body = DownstreamBody::new(upstream.body, request_id);
    if method == Method::HEAD {
        body = body.without_length();
    }

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    response
}

/// Upstream body relayed to the caller chunk by chunk.
pub struct DownstreamBody<B = Incoming> {
    inner: B,
    request_id: String,
    bytes_sent: u64,
    started: Instant,
    failed: bool,
    report_length: bool,
}

impl<B> DownstreamBody<B> {
    pub fn new(inner: B, request_id: impl Into<String>) -> Self {
        Self {
            inner,
            request_id: request_id.into(),
            bytes_sent: 0,
            started: Instant::now(),
            failed: false,
            report_length: true,
        }
    }

    /// Hide the inner body's length from the size hint.
    pub fn without_length(mut self) -> Self {
        self.report_length = false;
        self
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

impl<B> HttpBody for DownstreamBody<B>
where
    B: HttpBody<Data = Bytes> + Unpin,
    B::Error: std::error::Error,
{
    type Data = Bytes;
    type Error = GatewayError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.failed {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes_sent += data.len() as u64;
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.failed = true;
                let err = GatewayError::Stream(crate::error::error_chain(&e));
                tracing::warn!(
                    request_id = %this.request_id,
                    error_kind = err.kind(),
                    bytes_sent = this.bytes_sent,
                    error = %err,
                    "Upstream body failed mid-stream, aborting response"
                );
                metrics::record_upstream_error(err.kind());
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                tracing::debug!(
                    request_id = %this.request_id,
                    bytes_sent = this.bytes_sent,
                    elapsed_ms = this.started.elapsed().as_millis() as u64,
                    "Upstream body complete"
                );
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.failed || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        if self.report_length {
            self.inner.size_hint()
        } else {
            SizeHint::default()
        }
    }
}
