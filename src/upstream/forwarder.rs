//! Outbound request construction and dispatch.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper::body::Incoming;

use crate::error::GatewayError;
use crate::resilience::timeouts;
use crate::upstream::client::UpstreamClient;

/// Returns true if a request with `method` forwards its body.
///
/// GET and HEAD never carry an outbound body, whatever the caller sent.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// A request ready to be sent to the upstream origin.
pub struct ForwardedRequest {
    pub method: Method,
    pub uri: Uri,
    /// Already stripped of hop-by-hop headers.
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

impl ForwardedRequest {
    /// Build a forwarded request, attaching `body` only for methods that carry one.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Body) -> Self {
        let body = carries_body(&method).then_some(body);
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    fn into_request(self) -> Result<Request<Body>, GatewayError> {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(self.body.unwrap_or_else(Body::empty))
            .map_err(|e| GatewayError::InvalidTarget(e.to_string()))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Upstream reply whose body has not been read yet.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Incoming,
}

/// Sends forwarded requests to the upstream origin.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    response_timeout: Option<Duration>,
}

impl Forwarder {
    pub fn new(client: UpstreamClient, response_timeout: Option<Duration>) -> Self {
        Self {
            client,
            response_timeout,
        }
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout
    }

    /// Issue the outbound call and wait for response headers.
    ///
    /// The call is made once. 3xx responses are returned as received. Every
    /// connection, TLS or timeout failure comes back as `GatewayError::Network`.
    pub async fn forward(&self, request: ForwardedRequest) -> Result<UpstreamResponse, GatewayError> {
        let request = request.into_request()?;

        let response = timeouts::within(self.response_timeout, self.client.request(request))
            .await
            .map_err(|elapsed| GatewayError::network(elapsed.to_string()))??;

        let (parts, body) = response.into_parts();
        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
