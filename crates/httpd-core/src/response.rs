//! Response construction and wire serialization.

use serde::Serialize;

/// The original server's `status_text` table only ever named 200, 404 and
/// 500; every other code rendered with an empty reason phrase. 401 is added
/// here because the auth gate manufactures 401s itself and an empty reason
/// phrase on a status the core produces would be a self-inflicted gap, not
/// a preserved ambiguity. Every other code still renders with an empty
/// reason phrase, matching the original's fallback exactly.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// An HTTP response a handler builds and the dispatcher serializes.
///
/// Headers and cookies are both dict-like: setting the same name twice
/// overwrites the earlier value in place rather than appending a second
/// line, matching the original `Response.headers`/`Response.cookies` dicts.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    pub body: Vec<u8>,
}

fn dict_set(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), cookies: Vec::new(), body: Vec::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        dict_set(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Response::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    /// Serializes `value` as JSON. Serialization of the values handlers hand
    /// in (maps, vecs, primitives) cannot fail, so a failure here falls back
    /// to an empty object rather than panicking.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Response::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Response::new(302)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_header("Location", location.into())
    }

    /// Sets a cookie by name. No `HttpOnly`/`Secure`/`Max-Age`/`SameSite`
    /// attributes are added — the original server never set any, and the
    /// session middleware's clearing behavior is just `set_cookie(name, "")`.
    pub fn set_cookie(mut self, name: &str, value: &str) -> Self {
        dict_set(&mut self.cookies, name.to_string(), value.to_string());
        self
    }

    /// Renders the full response, including status line, `Date` and
    /// `Content-Length`, as wire bytes.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.body.len());
        out.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status)).as_bytes(),
        );
        out.extend_from_slice(format!("Date: {}\r\n", httpdate::fmt_http_date(std::time::SystemTime::now())).as_bytes());
        out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        for (name, value) in &self.cookies {
            out.extend_from_slice(format!("Set-Cookie: {name}={value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}
