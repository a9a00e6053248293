//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes are matched on the request path without its query string. Every
//! response closes the connection. Requests are recorded with their headers
//! so tests can assert on what was (or was not) fetched, and how.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
struct Response {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

/// One received request: target (path plus query) and headers, names lowercased.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub target: String,
    pub headers: HashMap<String, String>,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Response>,
    requests: Vec<Recorded>,
}

#[derive(Clone)]
pub struct StubServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl StubServer {
    /// Bind to an ephemeral port and serve in a background thread until the
    /// process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Absolute URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, status: &'static str, content_type: &'static str, body: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().routes.insert(
            path.to_string(),
            Response {
                status,
                content_type,
                body: body.into(),
            },
        );
    }

    /// Request targets (path plus query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|r| r.target.clone())
            .collect()
    }

    /// Headers of the first request whose path (query ignored) is `path`.
    pub fn headers_for(&self, path: &str) -> Option<HashMap<String, String>> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .find(|r| r.target.split('?').next() == Some(path))
            .map(|r| r.headers.clone())
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut lines = request.lines();
    let target = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let headers = lines
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    let path = target.split('?').next().unwrap_or("/").to_string();

    let response = {
        let mut state = state.lock().unwrap();
        state.requests.push(Recorded { target, headers });
        state.routes.get(&path).cloned()
    };
    let response = response.unwrap_or(Response {
        status: "404 Not Found",
        content_type: "text/plain",
        body: b"not found".to_vec(),
    });

    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&response.body);
}
