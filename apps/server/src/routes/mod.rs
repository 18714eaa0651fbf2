//! Route registration for the demo app. Each submodule attaches its routes
//! to a `&mut HttpServer`; `register_all` wires them up in `main`.

pub mod profile;
pub mod root;
pub mod sentences;

use httpd_core::HttpServer;

pub fn register_all(server: &mut HttpServer) {
    root::register(server);
    profile::register(server);
    sentences::register(server);
}
