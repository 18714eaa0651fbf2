//! Auth gate: a handler-level wrapper (not a `Middleware`) applied at route
//! registration, matching `require_auth` in the Python source — it runs
//! inside the session middleware, after the session has been loaded, and
//! short-circuits with 401 before the wrapped handler ever sees the request.

use std::sync::Arc;

use serde_json::json;

use crate::request::Request;
use crate::response::Response;
use crate::router::Handler;
use crate::session::DEFAULT_SESSION_COOKIE;

/// Rejects the request with 401 and clears the default `session` cookie
/// unless `session["user"]` is present. Use [`require_auth_with_cookie`] when
/// the session middleware was configured with a non-default cookie name.
pub fn require_auth(handler: Handler) -> Handler {
    require_auth_with_cookie(DEFAULT_SESSION_COOKIE, handler)
}

/// Same as [`require_auth`], but clears `cookie_name` on rejection instead of
/// the default `session` cookie — the name must match whatever the
/// `SessionMiddleware` wrapping this route was constructed with
/// (`SessionMiddleware::with_cookie_name`), or a 401 would clear a cookie the
/// session middleware never set and leave the real session cookie in place.
pub fn require_auth_with_cookie(cookie_name: impl Into<String>, handler: Handler) -> Handler {
    let cookie_name = cookie_name.into();
    Arc::new(move |req: &mut Request| {
        if !req.session.contains_key("user") {
            let cookie_names: Vec<&str> = req.cookies.keys().map(String::as_str).collect();
            tracing::debug!(?cookie_names, path = %req.path, "unauthorized visit, no user in session");
            return Response::json(401, &json!({"error": "Unauthorized"}))
                .set_cookie(&cookie_name, "");
        }
        handler(req)
    })
}
