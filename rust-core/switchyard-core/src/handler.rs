//! # Route Handlers
//!
//! A handler is either a plain function over the extracted parameters or a
//! controller object. Both receive parameters positionally, in template order,
//! and produce the response body.

use std::fmt;
use std::sync::Arc;

/// Function handler signature
pub type HandlerFn = dyn Fn(&[String]) -> String + Send + Sync;

/// Structured handler for routes backed by a controller
pub trait Controller: Send + Sync {
    /// Handle a request with the extracted parameters
    fn handle(&self, params: &[String]) -> String;

    /// Controller name for logging
    fn name(&self) -> &'static str {
        "Controller"
    }
}

/// Handler bound to a route
#[derive(Clone)]
pub enum Handler {
    /// Plain function
    Function(Arc<HandlerFn>),
    /// Controller object
    Controller(Arc<dyn Controller>),
}

impl Handler {
    /// Wrap a closure as a handler
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Wrap a controller as a handler
    pub fn controller<C: Controller + 'static>(controller: C) -> Self {
        Self::Controller(Arc::new(controller))
    }

    /// Invoke the handler
    pub fn invoke(&self, params: &[String]) -> String {
        match self {
            Self::Function(f) => f(params),
            Self::Controller(c) => c.handle(params),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Handler::Function"),
            Self::Controller(c) => write!(f, "Handler::Controller({})", c.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter;

    impl Controller for Greeter {
        fn handle(&self, params: &[String]) -> String {
            format!("hello {}", params.join(" "))
        }

        fn name(&self) -> &'static str {
            "Greeter"
        }
    }

    #[test]
    fn test_function_handler() {
        let handler = Handler::function(|params| params.join(":"));
        let params = vec!["a".to_string(), "b".to_string()];
        assert_eq!(handler.invoke(&params), "a:b");
    }

    #[test]
    fn test_controller_handler() {
        let handler = Handler::controller(Greeter);
        assert_eq!(handler.invoke(&["world".to_string()]), "hello world");
        assert_eq!(format!("{handler:?}"), "Handler::Controller(Greeter)");
    }
}
