//! Exact-match route registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::request::{Method, Request};
use crate::response::Response;

/// A handler is a pure function from a request to a response. It cannot
/// itself fail — anything an original Python handler would have raised is
/// caught by the dispatcher and turned into a 500.
pub type Handler = Arc<dyn Fn(&mut Request) -> Response + Send + Sync>;

/// Registers handlers under an exact `(Method, path)` pair. There is no
/// prefix or template matching: `/items` and `/items/` are different routes.
#[derive(Default)]
pub struct Router {
    routes: HashMap<(Method, String), Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    pub fn route<F>(&mut self, method: Method, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.routes.insert((method, path.into()), Arc::new(handler));
    }

    /// Registers an already-built `Handler`, e.g. the output of
    /// [`crate::authgate::require_auth`] wrapped around a closure.
    pub fn route_handler(&mut self, method: Method, path: impl Into<String>, handler: Handler) {
        self.routes.insert((method, path.into()), handler);
    }

    pub fn get<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.route(Method::Get, path, handler);
    }

    pub fn post<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.route(Method::Post, path, handler);
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<Handler> {
        self.routes.get(&(method.clone(), path.to_string())).cloned()
    }

    /// The registered `(method, path)` pairs, for startup logging.
    pub fn registered(&self) -> Vec<(Method, String)> {
        self.routes.keys().cloned().collect()
    }
}
