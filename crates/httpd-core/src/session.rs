//! Session middleware: loads the signed session cookie before the handler
//! runs and writes it back after, matching `JWT.__call__` in the Python
//! source this crate replaces (`tcp_server.py`).

use auth::Envelope;

use crate::middleware::Middleware;
use crate::request::Request;
use crate::router::Handler;

pub const DEFAULT_SESSION_COOKIE: &str = "session";

pub struct SessionMiddleware {
    envelope: Envelope,
    cookie_name: String,
}

impl SessionMiddleware {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { envelope: Envelope::new(secret), cookie_name: DEFAULT_SESSION_COOKIE.to_string() }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

impl Middleware for SessionMiddleware {
    fn wrap(&self, handler: Handler) -> Handler {
        let envelope = self.envelope.clone();
        let cookie_name = self.cookie_name.clone();
        std::sync::Arc::new(move |req: &mut Request| {
            req.session = req
                .cookies
                .get(&cookie_name)
                .map(|raw| envelope.decode(raw))
                .unwrap_or_default();

            let response = handler(req);

            if req.session.is_empty() {
                response.set_cookie(&cookie_name, "")
            } else {
                match envelope.encode(&req.session) {
                    Ok(wire) => response.set_cookie(&cookie_name, &wire),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode session cookie");
                        response.set_cookie(&cookie_name, "")
                    }
                }
            }
        })
    }
}
