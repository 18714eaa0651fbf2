//! Server core: request parsing, routing, session middleware, the auth
//! gate, and the blocking worker-pool listener. The wire protocol and
//! concurrency model are deliberately simple — one request per connection,
//! no async runtime, threads blocked in `accept`/`read`/`write` — matching
//! the Python reference server this crate replaces.

pub mod authgate;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod session;
pub mod tls;

pub use authgate::{require_auth, require_auth_with_cookie};
pub use connection::Conn;
pub use error::{Error, ParseError};
pub use middleware::Middleware;
pub use request::{Method, Request};
pub use response::Response;
pub use router::{Handler, Router};
pub use server::{HttpServer, ServerConfig};
pub use session::SessionMiddleware;
pub use tls::TlsAcceptor;
