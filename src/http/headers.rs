//! Hop-by-hop header filtering.
//!
//! # Responsibilities
//! - Hold the immutable set of header names that never cross the gateway
//! - Strip them from inbound request headers before forwarding
//! - Strip them from upstream response headers before replying
//!
//! # Design Decisions
//! - `HeaderName` is stored lowercase, so matching is case-insensitive
//! - Filtering builds a new map; the input is never mutated
//! - Every value of a repeated header (e.g. `Set-Cookie`) is kept

use axum::http::header::{self, HeaderMap, HeaderName};

/// Header names that are meaningful only for a single transport leg.
pub const HOP_BY_HOP_HEADERS: [HeaderName; 10] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    HeaderName::from_static("trailers"),
    header::UPGRADE,
];

/// Immutable, case-insensitive set of header names removed in both directions.
#[derive(Debug, Clone)]
pub struct HeaderDenylist {
    names: Vec<HeaderName>,
}

impl HeaderDenylist {
    /// The standard hop-by-hop denylist.
    pub fn hop_by_hop() -> Self {
        Self {
            names: HOP_BY_HOP_HEADERS.to_vec(),
        }
    }

    /// Returns true if `name` is denied.
    pub fn contains(&self, name: &HeaderName) -> bool {
        self.names.contains(name)
    }

    /// Returns true if the raw `name` is denied, ignoring ASCII case.
    pub fn contains_str(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str().eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[HeaderName] {
        &self.names
    }

    /// Return a copy of `headers` with every denied entry removed.
    ///
    /// Names are visited in the order the map yields them and each name keeps
    /// all of its values in their original order.
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        let mut filtered = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            if !self.contains(name) {
                filtered.append(name.clone(), value.clone());
            }
        }
        filtered
    }
}

impl Default for HeaderDenylist {
    fn default() -> Self {
        Self::hop_by_hop()
    }
}
