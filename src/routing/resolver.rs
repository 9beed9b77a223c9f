//! Upstream URL resolution.
//!
//! # Responsibilities
//! - Capture the path segments that follow the gateway prefix
//! - Join them under the upstream origin with exactly one leading slash
//! - Append the query string verbatim
//!
//! # Design Decisions
//! - Segments are taken from the raw request path, so percent-escapes are
//!   forwarded exactly as the caller sent them (no decode/encode round trip)
//! - An empty segment list resolves to the origin root
//! - Prefix matching is segment-aware: `/api/proxyfoo` is not under `/api/proxy`

use axum::http::Uri;

use crate::config::UpstreamOrigin;
use crate::error::GatewayError;

/// Builds absolute upstream URIs from inbound request paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    origin: UpstreamOrigin,
    prefix: String,
}

impl PathResolver {
    pub fn new(origin: UpstreamOrigin, prefix: impl Into<String>) -> Self {
        Self {
            origin,
            prefix: prefix.into(),
        }
    }

    pub fn origin(&self) -> &UpstreamOrigin {
        &self.origin
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Split `path` into the segments following the prefix.
    ///
    /// Returns `None` when `path` is not under the prefix.
    pub fn capture<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return Some(Vec::new());
        }
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() {
            return Some(Vec::new());
        }
        Some(rest.split('/').collect())
    }

    /// Build `<origin>/<segments joined by '/'>[?<query>]`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        segments: &[S],
        query: Option<&str>,
    ) -> Result<Uri, GatewayError> {
        let path_len: usize = segments.iter().map(|s| s.as_ref().len() + 1).sum();
        let query = query.filter(|q| !q.is_empty());
        let mut target = String::with_capacity(
            self.origin.as_str().len() + path_len + 1 + query.map_or(0, |q| q.len() + 1),
        );

        target.push_str(self.origin.as_str());
        target.push('/');
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                target.push('/');
            }
            target.push_str(segment.as_ref());
        }
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        target
            .parse::<Uri>()
            .map_err(|e| GatewayError::InvalidTarget(format!("{}: {}", target, e)))
    }

    /// Resolve an inbound request URI in one step.
    ///
    /// Returns `None` when the URI is outside the prefix.
    pub fn resolve_uri(&self, uri: &Uri) -> Option<Result<Uri, GatewayError>> {
        let segments = self.capture(uri.path())?;
        Some(self.resolve(&segments, uri.query()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new(
            UpstreamOrigin::parse("http://localhost:8000").unwrap(),
            "/api/proxy",
        )
    }

    #[test]
    fn test_capture_segments() {
        let r = resolver();
        assert_eq!(
            r.capture("/api/proxy/v1/admin/audit"),
            Some(vec!["v1", "admin", "audit"])
        );
        assert_eq!(r.capture("/api/proxy"), Some(vec![]));
        assert_eq!(r.capture("/api/proxy/"), Some(vec![]));
        assert_eq!(r.capture("/api/proxyfoo"), None);
        assert_eq!(r.capture("/other/v1"), None);
    }

    #[test]
    fn test_resolve_with_query() {
        let uri = resolver()
            .resolve(&["v1", "admin", "audit"], Some("limit=50"))
            .unwrap();
        assert_eq!(uri.to_string(), "http://localhost:8000/v1/admin/audit?limit=50");
    }

    #[test]
    fn test_empty_segments_resolve_to_root() {
        let empty: [&str; 0] = [];
        let r = resolver();
        assert_eq!(r.resolve(&empty, None).unwrap().to_string(), "http://localhost:8000/");
        assert_eq!(
            r.resolve(&empty, Some("")).unwrap().to_string(),
            "http://localhost:8000/"
        );
    }

    #[test]
    fn test_escapes_and_query_are_verbatim() {
        let uri: Uri = "/api/proxy/v1/files/a%20b%2Fc?q=it's%20here&x=%7E&x=2"
            .parse()
            .unwrap();
        let target = resolver().resolve_uri(&uri).unwrap().unwrap();
        assert_eq!(target.path(), "/v1/files/a%20b%2Fc");
        assert_eq!(target.query(), Some("q=it's%20here&x=%7E&x=2"));
    }

    #[test]
    fn test_trailing_and_inner_empty_segments_kept() {
        let uri: Uri = "/api/proxy/v1//policies/".parse().unwrap();
        let target = resolver().resolve_uri(&uri).unwrap().unwrap();
        assert_eq!(target.path(), "/v1//policies/");
    }

    #[test]
    fn test_https_origin_with_default_port() {
        let r = PathResolver::new(
            UpstreamOrigin::parse("https://api.example.com").unwrap(),
            "/gateway",
        );
        let uri: Uri = "/gateway/v1/x".parse().unwrap();
        let target = r.resolve_uri(&uri).unwrap().unwrap();
        assert_eq!(target.scheme_str(), Some("https"));
        assert_eq!(target.host(), Some("api.example.com"));
        assert_eq!(target.to_string(), "https://api.example.com/v1/x");
    }

    #[test]
    fn test_outside_prefix_is_none() {
        let uri: Uri = "/health".parse().unwrap();
        assert!(resolver().resolve_uri(&uri).is_none());
    }
}
