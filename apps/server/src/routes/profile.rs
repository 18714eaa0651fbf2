//! `GET /my_profile` and `GET /logout` — the two session-bearing demo
//! routes. `/my_profile` is gated by [`httpd_core::require_auth`]; the
//! original also returned a truncated session token alongside the user
//! object, which is a session-leaking side channel and is dropped here.

use std::sync::Arc;

use httpd_core::{require_auth, HttpServer, Request, Response};

pub fn register(server: &mut HttpServer) {
    server.get_handler("/my_profile", require_auth(Arc::new(my_profile)));
    server.get("/logout", logout);
}

fn my_profile(req: &mut Request) -> Response {
    let user = req.session.get("user").cloned().unwrap_or_default();
    Response::json(200, &user)
}

fn logout(req: &mut Request) -> Response {
    req.session.clear();
    Response::redirect("/")
}
