//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (GATEWAY_*)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → UpstreamOrigin + HeaderDenylist shared via Arc to every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults except the upstream origin
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod origin;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, load_config};
pub use origin::UpstreamOrigin;
pub use schema::{
    GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, RoutingConfig, TlsConfig,
    UpstreamConfig,
};
pub use validation::{ValidationError, validate_config};
