//! # Route Table
//!
//! Per-request routing: routes are registered in order and the first one that
//! is eligible for the request snapshot becomes the selected route.
//!
//! ## Features
//!
//! - First-wins selection, decided at registration time
//! - HTTPS, verb and host constraints
//! - Positional parameter extraction (`/users/{name}`)
//! - Link generation, asset rooting and redirects
//!
//! A table serves exactly one request. Build a new one per request rather
//! than sharing it.

use crate::config::{normalize_root, RouterConfig};
use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::request::RequestSnapshot;
use crate::route::{Constraints, RouteDefinition};
use crate::template::{collapse_separators, render, Template};
use crate::transport::{RedirectOutcome, TransportState};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of dispatching the selected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    /// Name of the route that handled the request
    pub route: String,
    /// Handler output
    pub output: String,
}

/// Ordered route registry bound to one request
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Routes in registration order
    routes: Vec<RouteDefinition>,
    /// Route name to position in `routes`
    index: HashMap<String, usize>,
    /// Position of the selected route
    selected: Option<usize>,
    request: RequestSnapshot,
    config: RouterConfig,
    /// Parameters from the last successful match
    params: Vec<String>,
}

impl RouteTable {
    /// Create an empty table for `request` with default settings
    #[must_use]
    pub fn new(request: RequestSnapshot) -> Self {
        Self::with_config(request, RouterConfig::default())
    }

    /// Create an empty table with explicit settings
    #[must_use]
    pub fn with_config(request: RequestSnapshot, config: RouterConfig) -> Self {
        let config = RouterConfig {
            document_root: normalize_root(&config.document_root),
            ..config
        };

        Self {
            routes: Vec::new(),
            index: HashMap::new(),
            selected: None,
            request,
            config,
            params: Vec::new(),
        }
    }

    /// Register a route, classifying the template string
    ///
    /// # Returns
    ///
    /// `Ok(true)` when stored, `Ok(false)` when the name is already taken
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedTemplate` if the template or a token pattern
    /// does not compile; the route is not stored
    pub fn register(
        &mut self,
        name: &str,
        template: &str,
        handler: Handler,
        constraints: Constraints,
    ) -> Result<bool> {
        let template = Template::parse(template, &self.config.auto_marker);
        self.register_template(name, template, handler, constraints)
    }

    /// Register a route with an explicitly typed template
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedTemplate` if the template or a token pattern
    /// does not compile; the route is not stored
    pub fn register_template(
        &mut self,
        name: &str,
        template: Template,
        handler: Handler,
        constraints: Constraints,
    ) -> Result<bool> {
        if self.has(name) {
            debug!(route = %name, "Route name already registered");
            return Ok(false);
        }

        let route = RouteDefinition::new(name, template, handler, constraints)?;
        debug!(
            route = %name,
            template = %route.template(),
            kind = %route.template().kind(),
            "Route registered"
        );

        let position = self.routes.len();
        self.routes.push(route);
        self.index.insert(name.to_string(), position);

        if self.selected.is_none() && self.evaluate(position) {
            debug!(route = %name, path = %self.request.path(), "Route selected");
            self.selected = Some(position);
        }

        Ok(true)
    }

    /// Register an unconstrained closure route
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::register`]
    pub fn add<F>(&mut self, name: &str, template: &str, f: F) -> Result<bool>
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.register(name, template, Handler::function(f), Constraints::new())
    }

    /// Check eligibility and record the extracted parameters on success
    fn evaluate(&mut self, position: usize) -> bool {
        match self.routes[position].eligible_params(&self.request) {
            Some(params) => {
                self.params = params;
                true
            }
            None => false,
        }
    }

    /// Whether the named route is eligible for this table's request
    ///
    /// Unknown names are never eligible.
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|route| route.eligible_params(&self.request).is_some())
    }

    /// Run the selected route's handler
    ///
    /// # Errors
    ///
    /// Returns `Error::NoMatchingRoute` if no route was selected
    pub fn dispatch(&self) -> Result<Handled> {
        let Some(route) = self.selected.map(|i| &self.routes[i]) else {
            warn!(
                method = %self.request.method(),
                path = %self.request.path(),
                "No matching route"
            );
            return Err(Error::NoMatchingRoute {
                path: self.request.path().to_string(),
            });
        };

        info!(
            route = %route.name(),
            method = %self.request.method(),
            path = %self.request.path(),
            params = ?self.params,
            "Dispatching route"
        );

        Ok(Handled {
            route: route.name().to_string(),
            output: route.handler().invoke(&self.params),
        })
    }

    /// Generate a rooted path for a route
    ///
    /// Tokens are replaced by the given values; tokens without a value are
    /// dropped. A name that is not a registered route is treated as a path
    /// (rooted) or an absolute URL (returned unchanged).
    #[must_use]
    pub fn link(&self, name: &str, params: &[(&str, &str)]) -> String {
        let Some(route) = self.get(name) else {
            if is_absolute_url(name) {
                return name.to_string();
            }
            return self.asset(name);
        };

        let missing: Vec<String> = route
            .template()
            .tokens()
            .into_iter()
            .filter(|token| !params.iter().any(|(key, _)| key == token))
            .collect();
        if !missing.is_empty() {
            debug!(route = %name, missing = ?missing, "Link generated without some parameters");
        }

        let rendered = render(route.template().body(), params);
        self.asset(rendered.trim_start_matches('/'))
    }

    /// Root an asset or application path under the document root
    #[must_use]
    pub fn asset(&self, path: &str) -> String {
        collapse_separators(&format!("{}{}", self.config.document_root, path))
    }

    /// Redirect to a route or URL
    ///
    /// Emits a location redirect when nothing has been sent yet, otherwise
    /// falls back to an in-body refresh. Both point at the same target.
    pub fn redirect<T>(
        &self,
        name: &str,
        params: &[(&str, &str)],
        transport: &mut T,
    ) -> RedirectOutcome
    where
        T: TransportState + ?Sized,
    {
        let target = self.link(name, params);

        if transport.headers_sent() {
            debug!(url = %target, "Headers already sent, using refresh fallback");
            transport.emit_meta_refresh(&target);
            RedirectOutcome::Refreshed(target)
        } else {
            info!(url = %target, "Redirecting");
            transport.emit_redirect(&target);
            RedirectOutcome::Halted(target)
        }
    }

    /// Whether a route with this name exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Whether any route has been registered
    #[must_use]
    pub fn has_any_routes(&self) -> bool {
        !self.routes.is_empty()
    }

    /// Look up a route by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteDefinition> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    /// Name of the selected route
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.selected.map(|i| self.routes[i].name())
    }

    /// Parameters from the last successful match
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Routes in registration order
    #[must_use]
    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// Document root used for links and assets
    #[must_use]
    pub fn root(&self) -> &str {
        &self.config.document_root
    }

    /// Request snapshot this table routes
    #[must_use]
    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }
}

fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| url.has_host())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Scheme;
    use crate::transport::RecordingTransport;

    fn noop() -> Handler {
        Handler::function(|_| String::new())
    }

    #[test]
    fn test_duplicate_name_rejected_without_mutation() {
        let mut table = RouteTable::new(RequestSnapshot::get("/users"));
        assert!(table.add("users", "/users", |_| "first".to_string()).unwrap());
        assert!(!table.add("users", "/other", |_| "second".to_string()).unwrap());

        assert_eq!(table.routes().len(), 1);
        assert_eq!(table.get("users").unwrap().template().source(), "/users");
        assert_eq!(table.dispatch().unwrap().output, "first");
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut table = RouteTable::new(RequestSnapshot::get("/users/admin"));
        table.add("a", "/users/{name}", |_| "a".to_string()).unwrap();
        table.add("b", "/users/{id}", |_| "b".to_string()).unwrap();

        assert_eq!(table.current(), Some("a"));
        assert_eq!(table.dispatch().unwrap().route, "a");
    }

    #[test]
    fn test_malformed_template_not_registered() {
        let mut table = RouteTable::new(RequestSnapshot::get("/"));
        let result = table.register_template("bad", Template::raw("/x/("), noop(), Constraints::new());

        assert!(matches!(result, Err(Error::MalformedTemplate { .. })));
        assert!(!table.has("bad"));
        assert!(!table.has_any_routes());
    }

    #[test]
    fn test_params_from_selected_match() {
        let mut table = RouteTable::new(RequestSnapshot::get("/test/x/y"));
        table.add("pair", "/test/{a}/{b}", |p| p.join(",")).unwrap();

        assert_eq!(table.params(), ["x", "y"]);
        assert_eq!(table.dispatch().unwrap().output, "x,y");
    }

    #[test]
    fn test_is_eligible_checks_constraints() {
        let request = RequestSnapshot::get("/admin").with_scheme(Scheme::Https);
        let mut table = RouteTable::new(request);
        table
            .register("post", "/admin", noop(), Constraints::new().verb("POST"))
            .unwrap();
        table
            .register("secure", "/admin", noop(), Constraints::new().https())
            .unwrap();

        assert!(!table.is_eligible("post"));
        assert!(table.is_eligible("secure"));
        assert!(!table.is_eligible("missing"));
        assert_eq!(table.current(), Some("secure"));
    }

    #[test]
    fn test_dispatch_without_selection() {
        let mut table = RouteTable::new(RequestSnapshot::get("/nowhere"));
        table.add("home", "/", |_| String::new()).unwrap();

        let err = table.dispatch().unwrap_err();
        assert!(matches!(err, Error::NoMatchingRoute { ref path } if path == "/nowhere"));
    }

    #[test]
    fn test_link_with_document_root() {
        let config = RouterConfig::default().with_document_root("/app");
        let mut table = RouteTable::with_config(RequestSnapshot::get("/"), config);
        table.add("user", "/users/{name}", |_| String::new()).unwrap();

        assert_eq!(table.root(), "/app/");
        assert_eq!(table.link("user", &[("name", "Loas")]), "/app/users/Loas");
        assert_eq!(table.link("user", &[]), "/app/users/");
    }

    #[test]
    fn test_link_passthrough() {
        let table = RouteTable::new(RequestSnapshot::get("/"));
        assert_eq!(table.link("images/rei.jpg", &[]), "/images/rei.jpg");
        assert_eq!(
            table.link("https://example.com/x", &[]),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_link_strips_auto_marker() {
        let mut table = RouteTable::new(RequestSnapshot::get("/"));
        table.add("docs", "/docs/[auto]", |_| String::new()).unwrap();
        assert_eq!(table.link("docs", &[]), "/docs/");
    }

    #[test]
    fn test_asset_collapses_separators() {
        let table = RouteTable::new(RequestSnapshot::get("/"));
        assert_eq!(table.asset("/css//site.css"), "/css/site.css");
    }

    #[test]
    fn test_redirect_branches_on_headers_sent() {
        let mut table = RouteTable::new(RequestSnapshot::get("/"));
        table.add("user", "/users/{name}", |_| String::new()).unwrap();

        let mut fresh = RecordingTransport::new();
        let outcome = table.redirect("user", &[("name", "Loas")], &mut fresh);
        assert_eq!(outcome, RedirectOutcome::Halted("/users/Loas".to_string()));
        assert_eq!(fresh.location.as_deref(), Some("/users/Loas"));

        let mut started = RecordingTransport::new().with_headers_sent();
        let outcome = table.redirect("user", &[("name", "Loas")], &mut started);
        assert_eq!(outcome, RedirectOutcome::Refreshed("/users/Loas".to_string()));
        assert!(started.location.is_none());
        assert!(started.body.contains("URL=/users/Loas"));
    }
}
