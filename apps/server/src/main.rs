// Demo server entrypoint
//
// This wires up `httpd-core`'s `HttpServer`: a `ServerConfig` read from the
// environment, the signed-cookie session middleware, and the demo route
// table. There is no async runtime here — `HttpServer::serve` blocks the
// main thread in a worker pool until an interrupt signal exits the process.
use anyhow::{Context, Result};
use httpd_core::{HttpServer, ServerConfig, SessionMiddleware};
use readly_server::routes;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let secret = config
        .session_secret
        .clone()
        .context("HTTPD_SESSION_SECRET must be set to start the session middleware")?;

    let mut server = HttpServer::new(config);
    server.use_middleware(SessionMiddleware::new(secret));

    routes::register_all(&mut server);

    server.serve().context("server exited with an error")?;
    Ok(())
}
