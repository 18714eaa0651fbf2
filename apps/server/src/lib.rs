//! The demo route table, split out from `main` so integration tests can
//! stand up the real routes (not synthetic stand-ins) against a real bound
//! `HttpServer`.

pub mod routes;
