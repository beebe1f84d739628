//! # Configuration
//!
//! Router settings and JSON route manifests.
//!
//! A manifest describes a whole route table:
//!
//! ```json
//! {
//!   "config": { "document_root": "/app/" },
//!   "routes": [
//!     { "name": "home", "template": "/", "response": "Hello" },
//!     { "name": "user", "template": "/users/{name}", "verb": ["GET", "HEAD"],
//!       "pattern": { "name": "[a-z]+" }, "response": "user {0}" }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::request::RequestSnapshot;
use crate::route::{Constraints, OneOrMany};
use crate::router::RouteTable;
use crate::template::{Template, DEFAULT_AUTO_MARKER};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Router-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix prepended to generated links and assets
    pub document_root: String,
    /// Marker that turns a template into an auto-prefix route
    pub auto_marker: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            document_root: "/".to_string(),
            auto_marker: DEFAULT_AUTO_MARKER.to_string(),
        }
    }
}

impl RouterConfig {
    /// Config with the given document root
    #[must_use]
    pub fn with_document_root(mut self, root: impl Into<String>) -> Self {
        self.document_root = root.into();
        self
    }

    /// Check settings and normalize the document root to `/…/`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the auto marker is empty or could be
    /// mistaken for a placeholder token
    pub fn validate(mut self) -> Result<Self> {
        if self.auto_marker.is_empty() {
            return Err(Error::Config {
                message: "auto_marker must not be empty".to_string(),
            });
        }
        if self.auto_marker.starts_with('{') {
            return Err(Error::Config {
                message: format!("auto_marker {} clashes with token syntax", self.auto_marker),
            });
        }

        self.document_root = normalize_root(&self.document_root);
        Ok(self)
    }
}

/// Ensure a root of the form `/` or `/prefix/`
pub(crate) fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// One route entry in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Unique route name
    pub name: String,
    /// Route template
    pub template: String,
    /// Treat the template as a raw regular expression
    #[serde(default)]
    pub raw: bool,
    /// Require HTTPS
    #[serde(default)]
    pub https: bool,
    /// Allowed methods
    #[serde(default)]
    pub verb: Option<OneOrMany<String>>,
    /// Allowed hosts
    #[serde(default)]
    pub domain: Option<OneOrMany<String>>,
    /// Per-token patterns
    #[serde(default)]
    pub pattern: HashMap<String, String>,
    /// Response body; `{0}`, `{1}`, … are replaced by parameters
    #[serde(default)]
    pub response: Option<String>,
}

impl RouteSpec {
    /// Constraints described by this entry
    #[must_use]
    pub fn constraints(&self) -> Constraints {
        Constraints {
            require_https: self.https,
            verbs: self.verb.clone(),
            hosts: self.domain.clone(),
            token_patterns: self.pattern.clone(),
        }
    }

    /// Template, honouring the `raw` flag
    #[must_use]
    pub fn template(&self, auto_marker: &str) -> Template {
        if self.raw {
            Template::raw(&self.template)
        } else {
            Template::parse(&self.template, auto_marker)
        }
    }

    /// Handler that renders `response` with positional parameters
    #[must_use]
    pub fn handler(&self) -> Handler {
        let name = self.name.clone();
        let response = self.response.clone();
        Handler::function(move |params| match &response {
            Some(body) => fill_positional(body, params),
            None if params.is_empty() => name.clone(),
            None => format!("{name} {}", params.join(" ")),
        })
    }
}

fn fill_positional(body: &str, params: &[String]) -> String {
    params
        .iter()
        .enumerate()
        .fold(body.to_string(), |acc, (i, value)| {
            acc.replace(&format!("{{{i}}}"), value)
        })
}

/// A complete route table description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Router settings
    #[serde(default)]
    pub config: RouterConfig,
    /// Routes in registration order
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

impl RouteManifest {
    /// Parse a manifest from JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed input
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a manifest file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Json` if it
    /// cannot be parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading route manifest");
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build a route table for `request`, registering routes in order
    ///
    /// Duplicate names are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid settings and
    /// `Error::MalformedTemplate` for a route that does not compile
    pub fn build(&self, request: RequestSnapshot) -> Result<RouteTable> {
        let config = self.config.clone().validate()?;
        let marker = config.auto_marker.clone();
        let mut table = RouteTable::with_config(request, config);

        for spec in &self.routes {
            let registered = table.register_template(
                &spec.name,
                spec.template(&marker),
                spec.handler(),
                spec.constraints(),
            )?;
            if !registered {
                warn!(route = %spec.name, "Duplicate route name in manifest, skipped");
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "config": { "document_root": "app" },
        "routes": [
            { "name": "home", "template": "/", "response": "Hello" },
            { "name": "user", "template": "/users/{name}", "verb": "GET",
              "pattern": { "name": "[a-z]+" }, "response": "user {0}" },
            { "name": "year", "template": "/archive/[0-9]{4}", "raw": true },
            { "name": "home", "template": "/other" }
        ]
    }"#;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.document_root, "/");
        assert_eq!(config.auto_marker, "[auto]");
    }

    #[test]
    fn test_validate_normalizes_root() {
        let config = RouterConfig::default().with_document_root("app").validate().unwrap();
        assert_eq!(config.document_root, "/app/");

        let config = RouterConfig::default().with_document_root("").validate().unwrap();
        assert_eq!(config.document_root, "/");
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let config = RouterConfig {
            auto_marker: String::new(),
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = RouteManifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.routes.len(), 4);
        assert_eq!(manifest.config.auto_marker, "[auto]");
        assert!(manifest.routes[2].raw);
        assert_eq!(manifest.routes[1].verb, Some(OneOrMany::One("GET".to_string())));
    }

    #[test]
    fn test_build_and_dispatch() {
        let manifest = RouteManifest::from_json(MANIFEST).unwrap();
        let table = manifest.build(RequestSnapshot::get("/users/loas")).unwrap();

        assert_eq!(table.routes().len(), 3);
        assert_eq!(table.current(), Some("user"));
        assert_eq!(table.dispatch().unwrap().output, "user loas");
        assert_eq!(table.link("user", &[("name", "x")]), "/app/users/x");
    }

    #[test]
    fn test_build_raw_route() {
        let manifest = RouteManifest::from_json(MANIFEST).unwrap();
        let table = manifest.build(RequestSnapshot::get("/archive/2015")).unwrap();
        assert_eq!(table.current(), Some("year"));
        assert_eq!(table.dispatch().unwrap().output, "year");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(RouteManifest::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RouteManifest::load("/nonexistent/routes.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
