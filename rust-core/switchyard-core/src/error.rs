//! # Error Handling
//!
//! Centralized error types for Switchyard core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Duplicate route names are not errors: `RouteTable::register` reports them
//! as `Ok(false)`.

use thiserror::Error;

/// Result type alias for Switchyard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the routing engine
#[derive(Error, Debug)]
pub enum Error {
    /// No registered route was eligible for the current request
    ///
    /// Deliberately carries no detail about which constraint failed.
    #[error("No route found for path: {path}")]
    NoMatchingRoute {
        /// The request path that wasn't matched
        path: String,
    },

    /// A route template or token pattern failed to compile
    #[error("Invalid route template: {template}: {reason}")]
    MalformedTemplate {
        /// The offending template (or token override)
        template: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Route manifest or router configuration is unusable
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_route_error() {
        let err = Error::NoMatchingRoute {
            path: "/unknown".to_string(),
        };
        assert!(err.to_string().contains("/unknown"));
    }

    #[test]
    fn test_malformed_template_error() {
        let err = Error::MalformedTemplate {
            template: "/users/(".to_string(),
            reason: "unclosed group".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/users/("));
        assert!(msg.contains("unclosed group"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
