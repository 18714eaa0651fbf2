//! Drives the real demo routes (`/`, `/my_profile`, `/logout`,
//! `/sentence_measure/`) over a real bound `HttpServer`, exercising the
//! concrete end-to-end scenarios the core's own `tests/e2e.rs` can't reach
//! because those routes live here, not in `httpd-core`.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use auth::{Envelope, Session};
use httpd_core::{HttpServer, ServerConfig, SessionMiddleware};
use serde_json::json;

const PORT: u16 = 18735;
const SECRET: &str = "apps-server-e2e-secret";
static START: Once = Once::new();

fn start_server() {
    START.call_once(|| {
        thread::spawn(|| {
            let config = ServerConfig {
                host: "127.0.0.1".to_string(),
                port: PORT,
                n_workers: 4,
                tls: None,
                session_secret: Some(SECRET.to_string()),
            };
            let mut server = HttpServer::new(config);
            server.use_middleware(SessionMiddleware::new(SECRET));
            readly_server::routes::register_all(&mut server);
            server.serve().expect("test server exited");
        });
        thread::sleep(Duration::from_millis(200));
    });
}

fn signed_cookie(user: serde_json::Value) -> String {
    let envelope = Envelope::new(SECRET);
    let mut session = Session::new();
    session.insert("user".to_string(), user);
    envelope.encode(&session).expect("encode session")
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

fn header(response: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}: ");
    response.lines().find_map(|line| line.strip_prefix(prefix.as_str()).map(str::to_string))
}

fn set_cookie_pair(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        line.strip_prefix("Set-Cookie: ")
            .map(|rest| rest.split(';').next().unwrap().to_string())
    })
}

#[test]
fn root_route_is_an_unauthenticated_json_object() {
    start_server();
    let response = raw_request("GET / HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains("\"message\""));
}

#[test]
fn my_profile_without_cookie_is_401_with_cleared_session_cookie() {
    start_server();
    let response = raw_request("GET /my_profile HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 401 Unauthorized");
    assert!(response.contains("{\"error\":\"Unauthorized\"}"));
    assert_eq!(set_cookie_pair(&response), Some("session=".to_string()));
}

#[test]
fn my_profile_with_malformed_cookie_is_401() {
    start_server();
    let request = "GET /my_profile HTTP/1.1\r\nHost: 127.0.0.1\r\nCookie: session=lifeIsLikeaBoxOfChocolates\r\nConnection: close\r\n\r\n";
    let response = raw_request(request);
    assert_eq!(status_line(&response), "HTTP/1.1 401 Unauthorized");
}

#[test]
fn my_profile_with_valid_cookie_returns_the_session_user() {
    start_server();
    let cookie = signed_cookie(json!({"sub": "u1", "email": "a@b"}));
    let request = format!(
        "GET /my_profile HTTP/1.1\r\nHost: 127.0.0.1\r\nCookie: session={cookie}\r\nConnection: close\r\n\r\n"
    );
    let response = raw_request(&request);
    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains("\"email\":\"a@b\""));
}

#[test]
fn logout_redirects_and_clears_the_session_cookie() {
    start_server();
    let cookie = signed_cookie(json!({"sub": "u1", "email": "a@b"}));
    let request = format!(
        "GET /logout HTTP/1.1\r\nHost: 127.0.0.1\r\nCookie: session={cookie}\r\nConnection: close\r\n\r\n"
    );
    let response = raw_request(&request);
    assert_eq!(status_line(&response), "HTTP/1.1 302 Found");
    assert!(header(&response, "Location").is_some());
    assert_eq!(set_cookie_pair(&response), Some("session=".to_string()));
}

#[test]
fn sentence_measure_returns_a_text_id_and_splits_sentences() {
    start_server();
    let cookie = signed_cookie(json!({"sub": "u1", "email": "a@b"}));
    let body = json!({"text": "Hello there. How are you?"}).to_string();
    let request = format!(
        "POST /sentence_measure/ HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\nCookie: session={}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        cookie,
        body
    );
    let response = raw_request(&request);
    assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains("\"text_id\":\"text-"));
    assert!(response.contains("\"num_sentences\":2"));
}

#[test]
fn concurrent_sentence_measure_requests_all_succeed() {
    start_server();
    let cookie = signed_cookie(json!({"sub": "u1", "email": "a@b"}));
    let body = json!({"text": "One. Two. Three."}).to_string();
    let request = format!(
        "POST /sentence_measure/ HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\nCookie: session={}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        cookie,
        body
    );

    thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|_| scope.spawn(|| raw_request(&request)))
            .collect();
        for handle in handles {
            let response = handle.join().expect("worker thread panicked");
            assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
        }
    });
}
