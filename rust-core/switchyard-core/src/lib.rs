//! # Switchyard Core
//!
//! Core routing library for the Switchyard dispatcher.
//! Compiles route templates, selects the route for a request, and generates
//! links back to routes.
//!
//! ## Architecture
//!
//! A [`RouteTable`] is built for one request snapshot. Routes are registered
//! in priority order; the first eligible one is selected on the spot and later
//! dispatched with the parameters extracted from the path.
//!
//! ## Modules
//!
//! - `template` - Template classification, compilation and rendering
//! - `route` - Route definitions and constraints
//! - `router` - The per-request route table
//! - `handler` - Function and controller handlers
//! - `request` - Request snapshot and scheme
//! - `transport` - Redirect emission capability
//! - `config` - Router settings and JSON route manifests
//! - `telemetry` - Tracing subscriber setup
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod route;
pub mod router;
pub mod telemetry;
pub mod template;
pub mod transport;

pub use config::{RouteManifest, RouteSpec, RouterConfig};
pub use error::{Error, Result};
pub use handler::{Controller, Handler};
pub use request::{RequestSnapshot, Scheme};
pub use route::{Constraints, OneOrMany, RouteDefinition};
pub use router::{Handled, RouteTable};
pub use template::{CompiledTemplate, Template, TemplateKind};
pub use transport::{RecordingTransport, RedirectOutcome, TransportState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
