//! # Route Definitions
//!
//! A named template bound to a handler, plus the optional constraints that
//! decide whether the route is eligible for a request.
//!
//! ## Constraints
//!
//! - `require_https` - request must arrive over HTTPS
//! - `verbs` - allowed request methods (one or several)
//! - `hosts` - allowed hosts (one or several)
//! - `token_patterns` - per-token patterns replacing the default capture

use crate::error::Result;
use crate::handler::Handler;
use crate::request::{RequestSnapshot, Scheme};
use crate::template::{CompiledTemplate, Template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Exactly one value
    One(T),
    /// Any of several values
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Whether any contained value satisfies `pred`
    pub fn any(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        match self {
            Self::One(value) => pred(value),
            Self::Many(values) => values.iter().any(pred),
        }
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Eligibility rules attached to a route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Only eligible over HTTPS
    pub require_https: bool,
    /// Allowed request methods
    pub verbs: Option<OneOrMany<String>>,
    /// Allowed hosts
    pub hosts: Option<OneOrMany<String>>,
    /// Custom pattern per token name
    pub token_patterns: HashMap<String, String>,
}

impl Constraints {
    /// No constraints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require HTTPS
    #[must_use]
    pub fn https(mut self) -> Self {
        self.require_https = true;
        self
    }

    /// Restrict request methods
    #[must_use]
    pub fn verb(mut self, verbs: impl Into<OneOrMany<String>>) -> Self {
        self.verbs = Some(verbs.into());
        self
    }

    /// Restrict hosts
    #[must_use]
    pub fn host(mut self, hosts: impl Into<OneOrMany<String>>) -> Self {
        self.hosts = Some(hosts.into());
        self
    }

    /// Custom pattern for one token
    #[must_use]
    pub fn pattern(mut self, token: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.token_patterns.insert(token.into(), pattern.into());
        self
    }

    /// HTTPS requirement check
    #[must_use]
    pub fn allows_scheme(&self, scheme: Scheme) -> bool {
        !self.require_https || scheme.is_https()
    }

    /// Method check, case-insensitive
    #[must_use]
    pub fn allows_verb(&self, method: &str) -> bool {
        self.verbs
            .as_ref()
            .map_or(true, |verbs| verbs.any(|v| v.eq_ignore_ascii_case(method)))
    }

    /// Host check, exact string comparison
    #[must_use]
    pub fn allows_host(&self, host: &str) -> bool {
        self.hosts
            .as_ref()
            .map_or(true, |hosts| hosts.any(|h| h == host))
    }
}

/// A registered route
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    name: String,
    template: Template,
    constraints: Constraints,
    handler: Handler,
    compiled: CompiledTemplate,
}

impl RouteDefinition {
    /// Create a route, compiling its template
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedTemplate` if the template or one of the
    /// token patterns does not compile
    pub fn new(
        name: impl Into<String>,
        template: Template,
        handler: Handler,
        constraints: Constraints,
    ) -> Result<Self> {
        let compiled = template.compile(&constraints.token_patterns)?;

        Ok(Self {
            name: name.into(),
            template,
            constraints,
            handler,
            compiled,
        })
    }

    /// Route name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template as registered
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Route constraints
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Bound handler
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Compiled matcher
    #[must_use]
    pub fn compiled(&self) -> &CompiledTemplate {
        &self.compiled
    }

    /// Evaluate every constraint, then the pattern
    ///
    /// Returns the extracted parameters when the route is eligible.
    #[must_use]
    pub fn eligible_params(&self, request: &RequestSnapshot) -> Option<Vec<String>> {
        let c = &self.constraints;
        if !c.allows_scheme(request.scheme())
            || !c.allows_verb(request.method())
            || !c.allows_host(request.host())
        {
            return None;
        }

        self.compiled.match_path(request.normalized_path())
    }
}
