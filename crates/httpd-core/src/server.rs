//! Server configuration and the worker-thread pool.
//!
//! The listening socket is opened with `socket2` so `SO_REUSEADDR` can be
//! set before `bind` — `std::net::TcpListener::bind` alone does not expose
//! that option. Each worker thread owns a cloned listener handle and loops
//! `accept` → dispatch forever; a failed accept is logged and the loop
//! continues, matching the original server's worker loop. There is no
//! graceful per-worker shutdown: an interrupt signal logs and exits the
//! process directly, the same way the original relied on its worker threads
//! being daemon threads that died with the process.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use socket2::{Domain, Protocol, Socket, Type};

use crate::connection::Conn;
use crate::dispatcher;
use crate::error::Error;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::tls::TlsAcceptor;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_WORKERS: usize = 2;
const LISTEN_BACKLOG: i32 = 5;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub n_workers: usize,
    pub tls: Option<(String, String)>,
    pub session_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            n_workers: DEFAULT_WORKERS,
            tls: None,
            session_secret: None,
        }
    }
}

impl ServerConfig {
    /// Reads `HTTPD_HOST` (default `localhost`), `HTTPD_PORT` (default
    /// `8000`), `HTTPD_WORKERS` (default `2`), the TLS pair
    /// `HTTPD_CERT_FILE`/`HTTPD_KEY_FILE` (both or neither), and
    /// `HTTPD_SESSION_SECRET` (required by the session middleware, read here
    /// only so a single env pass configures the whole server).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("HTTPD_HOST").unwrap_or(defaults.host);
        let port = std::env::var("HTTPD_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let n_workers = std::env::var("HTTPD_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.n_workers);
        let tls = match (std::env::var("HTTPD_CERT_FILE").ok(), std::env::var("HTTPD_KEY_FILE").ok()) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        };
        let session_secret = std::env::var("HTTPD_SESSION_SECRET").ok();
        Self { host, port, n_workers, tls, session_secret }
    }
}

pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config, router: Router::new(), middlewares: Vec::new() }
    }

    pub fn get<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.router.get(path, handler);
    }

    pub fn post<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.router.post(path, handler);
    }

    /// Registers an already-built `Handler`, for routes composed with
    /// [`crate::authgate::require_auth`].
    pub fn get_handler(&mut self, path: impl Into<String>, handler: crate::router::Handler) {
        self.router.route_handler(crate::request::Method::Get, path, handler);
    }

    pub fn post_handler(&mut self, path: impl Into<String>, handler: crate::router::Handler) {
        self.router.route_handler(crate::request::Method::Post, path, handler);
    }

    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Binds, logs the route table, starts the worker pool, and blocks until
    /// an interrupt terminates the process.
    pub fn serve(self) -> Result<(), Error> {
        let HttpServer { config, router, middlewares } = self;
        let scheme = if config.tls.is_some() { "https" } else { "http" };
        let addr = format!("{}:{}", config.host, config.port);
        let socket_addr: SocketAddr = addr.parse().map_err(|e| Error::Bind {
            addr: addr.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")),
        })?;

        let listener = bind_listener(socket_addr).map_err(|source| Error::Bind { addr: addr.clone(), source })?;

        let tls_acceptor = match &config.tls {
            Some((cert, key)) => Some(TlsAcceptor::from_pem_files(cert, key)?),
            None => None,
        };

        tracing::info!("httpd-core server starting up");
        tracing::info!(url = %format!("{scheme}://{addr}"), "server running");
        for (method, path) in router.registered() {
            tracing::info!(%method, %path, "registered route");
        }

        let router = Arc::new(router);
        let middlewares: Arc<Vec<Arc<dyn Middleware>>> = Arc::new(middlewares);

        let mut handles = Vec::with_capacity(config.n_workers);
        for i in 0..config.n_workers {
            let worker_listener = listener.try_clone()?;
            let worker_router = Arc::clone(&router);
            let worker_middlewares = Arc::clone(&middlewares);
            let worker_tls = tls_acceptor.clone();
            let worker_scheme = scheme.to_string();
            let handle = thread::Builder::new()
                .name(format!("httpd-worker-{}", i + 1))
                .spawn(move || worker_loop(worker_listener, worker_tls, &worker_scheme, &worker_router, &worker_middlewares))?;
            handles.push(handle);
            tracing::info!(worker = i + 1, "started worker thread");
        }

        ctrlc::set_handler(move || {
            tracing::info!("interrupt received, shutting down server");
            std::process::exit(0);
        })
        .map_err(|e| Error::Signal(e.to_string()))?;

        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = Domain::for_address(addr);
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

fn worker_loop(
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    scheme: &str,
    router: &Router,
    middlewares: &[Arc<dyn Middleware>],
) {
    loop {
        match listener.accept() {
            Ok((stream, _peer)) => {
                let conn = match &tls {
                    Some(acceptor) => match acceptor.accept(stream) {
                        Ok(tls_stream) => Conn::Tls(Box::new(tls_stream)),
                        Err(e) => {
                            tracing::error!(error = %e, "TLS handshake failed");
                            continue;
                        }
                    },
                    None => Conn::Plain(stream),
                };
                dispatcher::dispatch(conn, scheme, router, middlewares);
            }
            Err(e) => {
                tracing::error!(error = %e, "worker accept failed");
            }
        }
    }
}
