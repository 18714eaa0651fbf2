//! Per-connection dispatch: parse one request, route it, run it through the
//! middleware chain, and write back exactly one response before the
//! connection closes. There is no keep-alive — each accepted connection
//! serves one request, matching `_handle_request` in the original server.

use std::io::{BufReader, Write};
use std::sync::Arc;

use crate::connection::Conn;
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

pub fn dispatch(mut conn: Conn, scheme: &str, router: &Router, middlewares: &[Arc<dyn Middleware>]) {
    let mut request = {
        let mut reader = BufReader::new(&mut conn);
        match Request::parse(&mut reader) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "failed to parse request");
                return;
            }
        }
    };

    if let Some(host) = request.header("host") {
        request.base_url = format!("{scheme}://{host}");
    }

    let method = request.method.clone();
    let path = request.path.clone();

    let response = match router.find(&method, &path) {
        Some(handler) => {
            let handler = middleware::apply(middlewares, handler);
            match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(&mut request))) {
                Ok(response) => response,
                Err(_) => {
                    tracing::error!(%method, %path, "handler panicked while processing request");
                    Response::text(500, "500 Internal Server Error")
                }
            }
        }
        None => {
            tracing::error!(%method, %path, "no handler found");
            Response::text(404, "404 Not Found")
        }
    };

    let status = response.status;
    let wire = response.to_wire();
    if let Err(e) = conn.write_all(&wire) {
        tracing::error!(error = %e, "failed to write response");
        return;
    }
    tracing::info!(%method, status, %path, "handled request");
}
