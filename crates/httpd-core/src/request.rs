//! Request line/header/body parsing.
//!
//! Requests are read off a buffered stream one line at a time, the way the
//! server's original Python implementation read off raw socket chunks: a
//! request line, headers up to the first blank line, then up to
//! `Content-Length` body bytes (a missing length means no body is read at
//! all; a stream that hits EOF before the declared length arrives yields
//! whatever was read rather than failing the parse).

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Read};
use std::str::FromStr;

use auth::Session;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        })
    }
}

/// A single parsed HTTP/1.1 request.
///
/// `base_url` and `session` are not filled in by the parser itself — the
/// dispatcher sets `base_url` from the scheme and `Host` header, and the
/// session middleware populates `session` from the signed session cookie.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub body: Vec<u8>,
    pub base_url: String,
    pub session: Session,
}

impl Request {
    /// Reads and parses one request from `reader`. The reader is expected to
    /// be positioned at the start of a request line.
    pub fn parse(reader: &mut impl BufRead) -> Result<Request, ParseError> {
        let request_line = read_line(reader)?.ok_or(ParseError::ConnectionClosed)?;
        let mut parts = request_line.split_whitespace();
        let method = parts.next().ok_or_else(|| ParseError::BadRequestLine(request_line.clone()))?;
        let target = parts.next().ok_or_else(|| ParseError::BadRequestLine(request_line.clone()))?;
        let _version = parts.next().ok_or_else(|| ParseError::BadRequestLine(request_line.clone()))?;

        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), parse_query(q)),
            None => (target.to_string(), HashMap::new()),
        };

        let mut headers = HashMap::new();
        loop {
            let line = read_line(reader)?.ok_or(ParseError::ConnectionClosed)?;
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::BadHeaderLine(line.clone()))?;
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let cookies = headers
            .get("cookie")
            .map(|raw| parse_cookies(raw))
            .unwrap_or_default();

        let content_length = match headers.get("content-length") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseError::BadContentLength(raw.clone()))?,
            None => 0,
        };

        let body = read_body_short_on_eof(reader, content_length)?;

        Ok(Request {
            method: Method::from_str(method).unwrap(),
            path,
            query,
            headers,
            cookies,
            body,
            base_url: String::new(),
            session: Session::new(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn body_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Reads one `\r\n`- or `\n`-terminated line, stripping the terminator.
/// Returns `Ok(None)` at EOF with nothing read.
fn read_line(reader: &mut impl BufRead) -> Result<Option<String>, ParseError> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw)?;
    if n == 0 {
        return Ok(None);
    }
    while raw.last() == Some(&b'\n') || raw.last() == Some(&b'\r') {
        raw.pop();
    }
    String::from_utf8(raw)
        .map(Some)
        .map_err(|e| ParseError::BadHeaderLine(String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Reads up to `content_length` bytes, stopping early on EOF and returning
/// whatever was received rather than erroring — a short body is not a parse
/// failure.
fn read_body_short_on_eof(reader: &mut impl BufRead, content_length: usize) -> Result<Vec<u8>, ParseError> {
    let mut body = Vec::with_capacity(content_length);
    let mut chunk = [0u8; 4096];
    while body.len() < content_length {
        let want = (content_length - body.len()).min(chunk.len());
        let n = reader.read(&mut chunk[..want])?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(body)
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

fn parse_cookies(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|kv| kv.trim().split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}
