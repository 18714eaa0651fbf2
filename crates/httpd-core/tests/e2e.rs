//! End-to-end tests driving a real bound `HttpServer` over raw TCP, the way
//! `wilsonzlin-aero`'s storage server integration tests drive a real bound
//! listener rather than calling handlers directly.
//!
//! These routes (`/`, `/login`, `/whoami`, `/whoami-custom-cookie`) are
//! synthetic stand-ins that exercise the core's routing, session middleware
//! and auth gate in isolation. The real demo routes (`/my_profile`,
//! `/logout`, `/sentence_measure/`) only exist in `apps/server`, which has
//! its own `tests/e2e.rs` driving those against a real bound server.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use httpd_core::{require_auth, require_auth_with_cookie, HttpServer, Request, Response, ServerConfig, SessionMiddleware};
use serde_json::json;

const PORT: u16 = 18734;
static START: Once = Once::new();

fn start_server() {
    START.call_once(|| {
        thread::spawn(|| {
            let config = ServerConfig {
                host: "127.0.0.1".to_string(),
                port: PORT,
                n_workers: 4,
                tls: None,
                session_secret: Some("e2e-test-secret".to_string()),
            };
            let mut server = HttpServer::new(config);
            server.use_middleware(SessionMiddleware::new("e2e-test-secret"));

            server.get("/", |_req: &mut Request| Response::json(200, &json!({"message": "Hello"})));

            server.post("/login", |req: &mut Request| {
                req.session.insert("user".to_string(), json!({"email": "demo@example.com"}));
                Response::json(200, &json!({"ok": true}))
            });

            server.get_handler(
                "/whoami",
                require_auth(Arc::new(|req: &mut Request| {
                    Response::json(200, req.session.get("user").unwrap())
                })),
            );

            server.get_handler(
                "/whoami-custom-cookie",
                require_auth_with_cookie(
                    "custom_session",
                    Arc::new(|req: &mut Request| Response::json(200, req.session.get("user").unwrap())),
                ),
            );

            server.serve().expect("test server exited");
        });
        thread::sleep(Duration::from_millis(200));
    });
}

fn raw_request(raw: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", PORT)).expect("connect to test server");
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    stream.write_all(raw.as_bytes()).expect("write request");
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or("")
}

fn set_cookie_pair(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        line.strip_prefix("Set-Cookie: ")
            .map(|rest| rest.split(';').next().unwrap().to_string())
    })
}

#[test]
fn root_route_returns_json_message() {
    start_server();
    let response = raw_request("GET / HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains("\"message\":\"Hello\""));
}

#[test]
fn unknown_route_returns_404() {
    start_server();
    let response = raw_request("GET /nope HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 404 Not Found");
}

#[test]
fn whoami_without_session_is_unauthorized() {
    start_server();
    let response = raw_request("GET /whoami HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 401 Unauthorized");
    assert_eq!(set_cookie_pair(&response), Some("session=".to_string()));
}

#[test]
fn whoami_with_malformed_cookie_is_unauthorized() {
    start_server();
    let request = "GET /whoami HTTP/1.1\r\nHost: 127.0.0.1\r\nCookie: session=lifeIsLikeaBoxOfChocolates\r\nConnection: close\r\n\r\n";
    let response = raw_request(request);
    assert_eq!(status_line(&response), "HTTP/1.1 401 Unauthorized");
}

#[test]
fn whoami_custom_cookie_clears_the_configured_cookie_name_on_401() {
    start_server();
    let response =
        raw_request("GET /whoami-custom-cookie HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 401 Unauthorized");
    assert_eq!(set_cookie_pair(&response), Some("custom_session=".to_string()));
}

#[test]
fn login_then_whoami_round_trips_the_session_cookie() {
    start_server();

    let body = "{}";
    let login_req = format!(
        "POST /login HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let login_response = raw_request(&login_req);
    assert_eq!(status_line(&login_response), "HTTP/1.1 200 OK");
    let cookie = set_cookie_pair(&login_response).expect("login sets a session cookie");

    let whoami_req = format!(
        "GET /whoami HTTP/1.1\r\nHost: 127.0.0.1\r\nCookie: {}\r\nConnection: close\r\n\r\n",
        cookie
    );
    let whoami_response = raw_request(&whoami_req);
    assert_eq!(status_line(&whoami_response), "HTTP/1.1 200 OK");
    assert!(whoami_response.contains("demo@example.com"));
}

#[test]
fn concurrent_requests_are_served_across_workers() {
    start_server();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                scope.spawn(|| {
                    let response = raw_request("GET / HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
                    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker thread panicked");
        }
    });
}
