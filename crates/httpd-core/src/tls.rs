//! TLS acceptance. Uses `rustls` directly in blocking mode rather than an
//! async-oriented wrapper: the handshake is driven to completion with
//! `ServerConnection::complete_io` before `accept` returns, so a failed
//! handshake is reported at accept time instead of on the first read.

use std::fs::File;
use std::io::BufReader as StdBufReader;
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::PrivateKeyDer;
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use rustls_pemfile::{certs, pkcs8_private_keys};

use crate::error::Error;

#[derive(Clone)]
pub struct TlsAcceptor {
    config: Arc<ServerConfig>,
}

impl TlsAcceptor {
    pub fn from_pem_files(cert_path: &str, key_path: &str) -> Result<Self, Error> {
        let cert_file = File::open(cert_path)
            .map_err(|e| Error::TlsConfig(format!("opening {cert_path}: {e}")))?;
        let cert_chain = certs(&mut StdBufReader::new(cert_file))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::TlsConfig(format!("reading certs from {cert_path}: {e}")))?;
        if cert_chain.is_empty() {
            return Err(Error::TlsConfig(format!("no certificates found in {cert_path}")));
        }

        let key_file = File::open(key_path)
            .map_err(|e| Error::TlsConfig(format!("opening {key_path}: {e}")))?;
        let mut keys = pkcs8_private_keys(&mut StdBufReader::new(key_file))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::TlsConfig(format!("reading key from {key_path}: {e}")))?;
        let key = keys
            .pop()
            .ok_or_else(|| Error::TlsConfig(format!("no PKCS#8 private key found in {key_path}")))?;

        let config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(cert_chain, PrivateKeyDer::Pkcs8(key))
            .map_err(|e| Error::TlsConfig(e.to_string()))?;

        Ok(Self { config: Arc::new(config) })
    }

    pub fn accept(&self, stream: TcpStream) -> std::io::Result<StreamOwned<ServerConnection, TcpStream>> {
        let mut conn = ServerConnection::new(Arc::clone(&self.config))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let mut sock = stream;
        while conn.is_handshaking() {
            conn.complete_io(&mut sock)?;
        }
        Ok(StreamOwned::new(conn, sock))
    }
}
