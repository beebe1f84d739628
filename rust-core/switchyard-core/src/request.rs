//! # Request Snapshot
//!
//! The parts of an inbound request the router needs: path, method, scheme and
//! host. Captured once before any route is registered and never changed.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport scheme of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    #[default]
    Http,
    /// HTTP over TLS
    Https,
}

impl Scheme {
    /// Interpret a server-style HTTPS flag (`on`, `off`, empty or missing)
    #[must_use]
    pub fn from_https_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case("off") => Self::Https,
            _ => Self::Http,
        }
    }

    /// Whether this is HTTPS
    #[must_use]
    pub fn is_https(self) -> bool {
        self == Self::Https
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" | "off" | "" => Ok(Self::Http),
            "https" | "on" | "1" => Ok(Self::Https),
            other => Err(Error::Config {
                message: format!("unknown scheme: {other}"),
            }),
        }
    }
}

/// Immutable description of the request being routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    path: String,
    method: String,
    scheme: Scheme,
    host: String,
}

impl RequestSnapshot {
    /// Create a snapshot; the method is stored upper-cased
    pub fn new(
        path: impl Into<String>,
        method: &str,
        scheme: Scheme,
        host: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            method: method.to_ascii_uppercase(),
            scheme,
            host: host.into(),
        }
    }

    /// Plain `GET` over HTTP to `localhost`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, "GET", Scheme::Http, "localhost")
    }

    /// Build a snapshot from a raw request URI
    ///
    /// The document root prefix, the `#fragment` and the `?query` are removed
    /// so only the application-relative path remains. The root is only
    /// stripped when it ends on a segment boundary.
    pub fn from_uri(
        uri: &str,
        document_root: &str,
        method: &str,
        scheme: Scheme,
        host: impl Into<String>,
    ) -> Self {
        let root = document_root.trim_end_matches('/');
        let relative = if root.is_empty() {
            uri
        } else {
            uri.strip_prefix(root)
                .filter(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
                .unwrap_or(uri)
        };
        let path = relative.split('#').next().unwrap_or_default();
        let path = path.split('?').next().unwrap_or_default();

        Self::new(path, method, scheme, host)
    }

    /// Set the method
    #[must_use]
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    /// Set the scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Request path as given
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path with surrounding separators trimmed, as used for matching
    #[must_use]
    pub fn normalized_path(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// Upper-cased request method
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request scheme
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Request host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_uppercased() {
        let req = RequestSnapshot::get("/").with_method("post");
        assert_eq!(req.method(), "POST");
    }

    #[test]
    fn test_normalized_path() {
        assert_eq!(RequestSnapshot::get("/users/").normalized_path(), "users");
        assert_eq!(RequestSnapshot::get("").normalized_path(), "");
    }

    #[test]
    fn test_from_uri_strips_root_query_and_fragment() {
        let req = RequestSnapshot::from_uri(
            "/app/users/42?tab=posts#top",
            "/app/",
            "get",
            Scheme::Https,
            "example.com",
        );
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.method(), "GET");
        assert!(req.scheme().is_https());
        assert_eq!(req.host(), "example.com");
    }

    #[test]
    fn test_from_uri_keeps_uri_when_root_ends_mid_segment() {
        let req = RequestSnapshot::from_uri("/application/x", "/app/", "GET", Scheme::Http, "h");
        assert_eq!(req.path(), "/application/x");

        let req = RequestSnapshot::from_uri("/app", "/app/", "GET", Scheme::Http, "h");
        assert_eq!(req.path(), "");

        let req = RequestSnapshot::from_uri("/app?x=1", "/app/", "GET", Scheme::Http, "h");
        assert_eq!(req.path(), "");
    }

    #[test]
    fn test_from_uri_with_site_root() {
        let req = RequestSnapshot::from_uri("/users?x=1", "/", "GET", Scheme::Http, "h");
        assert_eq!(req.path(), "/users");
    }

    #[test]
    fn test_https_flag() {
        assert_eq!(Scheme::from_https_flag(Some("on")), Scheme::Https);
        assert_eq!(Scheme::from_https_flag(Some("off")), Scheme::Http);
        assert_eq!(Scheme::from_https_flag(Some("")), Scheme::Http);
        assert_eq!(Scheme::from_https_flag(None), Scheme::Http);
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("HTTPS".parse::<Scheme>().unwrap(), Scheme::Https);
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert!("gopher".parse::<Scheme>().is_err());
    }
}
