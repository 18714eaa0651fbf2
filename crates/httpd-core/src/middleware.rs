//! Middleware-as-decorator: a middleware wraps a `Handler` in another
//! `Handler`, the same way the original server's `JWT.__call__` wrapped a
//! route callback in a closure that loads and saves the session around it.

use crate::router::Handler;

pub trait Middleware: Send + Sync {
    fn wrap(&self, handler: Handler) -> Handler;
}

/// Applies middlewares outermost-first: the first entry in `middlewares`
/// sees the request before any of the others.
pub fn apply(middlewares: &[std::sync::Arc<dyn Middleware>], handler: Handler) -> Handler {
    middlewares.iter().rev().fold(handler, |acc, mw| mw.wrap(acc))
}
