//! Per-request gateway errors and their translation into responses.

use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Fixed `detail` text of every gateway error response.
pub const BACKEND_FAILED_DETAIL: &str = "Backend request failed";

/// Failure while handling a single request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream call could not be established or completed
    /// (name resolution, refused connection, TLS, timeout).
    #[error("{message}")]
    Network { message: String },

    /// The captured path and query could not form a URL under the origin.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// The upstream body failed after the response status was committed.
    #[error("upstream stream failed: {0}")]
    Stream(String),
}

impl GatewayError {
    /// Kind tag used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Network { .. } | GatewayError::InvalidTarget(_) => "NetworkError",
            GatewayError::Stream(_) => "StreamError",
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network {
            message: message.into(),
        }
    }
}

impl From<hyper_util::client::legacy::Error> for GatewayError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        GatewayError::network(error_chain(&err))
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// JSON body returned to the caller when forwarding fails.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: &'static str,
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: BACKEND_FAILED_DETAIL,
            error: self.to_string(),
        };
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}
