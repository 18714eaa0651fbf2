//! HMAC-signed session envelope.
//!
//! The wire form is `<base64 payload>.<hex signature>`: a base64-encoded JSON
//! session mapping, a dot, and the lowercase-hex HMAC-SHA256 of the payload
//! segment. Decoding a malformed or tampered envelope never errors — it
//! yields an empty session, matching `load_session` in the Python source this
//! was ported from (`jwt_utils.py`).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;

/// A session is an arbitrary JSON object, keyed by string.
pub type Session = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to serialize session payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Signs and verifies the session cookie envelope for one HMAC secret.
#[derive(Clone)]
pub struct Envelope {
    secret: Vec<u8>,
}

impl Envelope {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    /// HMAC-SHA256 over `payload`, lowercase-hex encoded.
    pub fn sign(&self, payload: &[u8]) -> String {
        // HMAC accepts a key of any length; this never fails.
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.secret)
            .expect("HMAC-SHA256 accepts a key of any length");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time verification of `signature_hex` over `payload`.
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(mut mac) = <Hmac<Sha256> as Mac>::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    }

    /// `base64(json(session))` dot `hex(hmac(base64(json(session))))`.
    pub fn encode(&self, session: &Session) -> Result<String, EnvelopeError> {
        let json = serde_json::to_vec(session)?;
        let payload_b64 = STANDARD.encode(json);
        let signature = self.sign(payload_b64.as_bytes());
        Ok(format!("{payload_b64}.{signature}"))
    }

    /// Verify and decode a cookie value. Any failure — missing dot,
    /// malformed base64, bad signature, non-JSON payload — yields an empty
    /// session rather than an error.
    pub fn decode(&self, envelope: &str) -> Session {
        let Some((payload_b64, signature_hex)) = envelope.split_once('.') else {
            return Session::new();
        };
        if !self.verify(payload_b64.as_bytes(), signature_hex) {
            return Session::new();
        }
        let Ok(json) = STANDARD.decode(payload_b64) else {
            return Session::new();
        };
        serde_json::from_slice(&json).unwrap_or_default()
    }
}
