//! `GET /` — unauthenticated liveness/smoke-test endpoint.

use httpd_core::{HttpServer, Request, Response};
use serde_json::json;

pub fn register(server: &mut HttpServer) {
    server.get("/", root);
}

fn root(_req: &mut Request) -> Response {
    Response::json(200, &json!({"message": "Hello"}))
}
