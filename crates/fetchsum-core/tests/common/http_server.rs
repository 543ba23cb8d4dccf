//! Minimal HTTP/1.1 server for integration tests.
//!
//! Each connection serves exactly one request and is then closed. Responses
//! come from a handler closure; every request is recorded so tests can assert
//! on the headers a client sent (e.g. credentials after a redirect).

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::Duration;

/// A parsed request line plus headers.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// All values of header `name` (case-insensitive), in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: format!("{} {}\n", status, reason).into_bytes(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        let mut r = Self::status(302, "Found");
        r.headers.push(("Location".to_string(), location.to_string()));
        r
    }

    pub fn unauthorized() -> Self {
        let mut r = Self::status(401, "Unauthorized");
        r.headers
            .push(("WWW-Authenticate".to_string(), "Basic realm=\"test\"".to_string()));
        r
    }
}

pub(crate) type Handler = dyn Fn(&Request) -> Response + Send + Sync;

/// Running server: base URL (e.g. "http://127.0.0.1:12345") and the request log.
pub struct TestServer {
    pub base_url: String,
    pub(crate) requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requests received so far for `path`.
    pub fn requests_for(&self, path: &str) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start<F>(handler: F) -> TestServer
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    bypass_proxy_for_loopback();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let handler: Arc<Handler> = Arc::new(handler);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, handler.as_ref(), &log));
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Serves `body` at every path with 200 OK.
pub fn serve_body(body: Vec<u8>) -> TestServer {
    start(move |_| Response::ok(body.clone()))
}

/// libcurl honours `http_proxy` from the environment; keep loopback traffic direct.
pub(crate) fn bypass_proxy_for_loopback() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::env::set_var("no_proxy", "127.0.0.1,localhost");
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    });
}

fn handle(stream: TcpStream, handler: &Handler, log: &Mutex<Vec<Request>>) {
    let mut stream = stream;
    set_timeouts(&stream);
    serve(&mut stream, handler, log);
}

pub(crate) fn set_timeouts(stream: &TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
}

/// Reads one request from `stream`, records it and writes the handler's response.
pub(crate) fn serve<S: Read + Write>(
    stream: &mut S,
    handler: &Handler,
    log: &Mutex<Vec<Request>>,
) {
    let raw = match read_head(stream) {
        Some(r) => r,
        None => return,
    };
    let request = match parse_request(&raw) {
        Some(r) => r,
        None => return,
    };
    log.lock().unwrap().push(request.clone());

    let response = handler(&request);
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.reason,
        response.body.len()
    );
    for (k, v) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    if request.method != "HEAD" {
        let _ = stream.write_all(&response.body);
    }
    let _ = stream.flush();
}

/// Reads until the blank line ending the request head.
fn read_head<S: Read>(stream: &mut S) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn parse_request(raw: &str) -> Option<Request> {
    let mut lines = raw.split("\r\n");
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    Some(Request {
        method,
        path,
        headers,
    })
}
