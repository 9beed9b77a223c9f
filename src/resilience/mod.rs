//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (optional bound on response headers)
//!     → On expiry: upstream call dropped, 502 returned
//! ```
//!
//! # Design Decisions
//! - No retries: a failed call is reported once, retry policy belongs to the caller
//! - Connect timeout is enforced by the connector, response timeout here

pub mod timeouts;
