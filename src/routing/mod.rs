//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path + query
//!     → resolver.rs (strip gateway prefix, split raw segments)
//!     → absolute upstream URI under the configured origin
//! ```
//!
//! # Design Decisions
//! - One prefix, one origin: there is no route table
//! - Resolution works on the raw path, never on decoded parameters

pub mod resolver;

pub use resolver::PathResolver;
