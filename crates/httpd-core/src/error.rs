//! Error types for the server core.

/// Failures that can occur while reading and parsing a request off the wire.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("connection closed before a request line was received")]
    ConnectionClosed,
    #[error("malformed request line: {0:?}")]
    BadRequestLine(String),
    #[error("malformed header line: {0:?}")]
    BadHeaderLine(String),
    #[error("declared Content-Length is not a valid number: {0:?}")]
    BadContentLength(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures that can prevent the server from starting or keep it from
/// running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load TLS certificate or key: {0}")]
    TlsConfig(String),
    #[error("failed to install the interrupt handler: {0}")]
    Signal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
