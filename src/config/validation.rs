//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a well-formed upstream origin
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the gateway prefix can be mounted as a route
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::origin::UpstreamOrigin;
use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream origin is not configured (set upstream.origin or GATEWAY_UPSTREAM_ORIGIN)")]
    MissingOrigin,

    #[error("invalid upstream origin '{value}': {reason}")]
    InvalidOrigin { value: String, reason: String },

    #[error("invalid routing prefix '{0}': must start with '/', must not end with '/', and must not contain '{{', '}}' or '*'")]
    InvalidPrefix(String),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("upstream.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.upstream.origin.as_deref() {
        None => errors.push(ValidationError::MissingOrigin),
        Some(raw) if raw.trim().is_empty() => errors.push(ValidationError::MissingOrigin),
        Some(raw) => {
            if let Err(e) = UpstreamOrigin::parse(raw) {
                errors.push(e);
            }
        }
    }

    if !is_valid_prefix(&config.routing.prefix) {
        errors.push(ValidationError::InvalidPrefix(config.routing.prefix.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() > 1
        && prefix.starts_with('/')
        && !prefix.ends_with('/')
        && !prefix.contains(['{', '}', '*', '?', '#'])
}
