//! Minimal HTTP/1.1 server standing in for the multi-query search endpoint.
//!
//! Answers `POST /1/indexes/*/queries` from a fixed id → label catalog. Each
//! query's id is read back from its `filters` parameter.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SearchServerOptions {
    /// The first N requests answer 500.
    pub fail_first: usize,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct SearchServer {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    headers: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl SearchServer {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Value of header `name` on the `n`th request (0-based).
    pub fn header(&self, n: usize, name: &str) -> Option<String> {
        let all = self.headers.lock().unwrap();
        all.get(n)?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

pub fn start(catalog: &[(&str, &str)]) -> SearchServer {
    start_with_options(catalog, SearchServerOptions::default())
}

pub fn start_with_options(catalog: &[(&str, &str)], opts: SearchServerOptions) -> SearchServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let catalog: Arc<HashMap<String, String>> = Arc::new(
        catalog
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    let server = SearchServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests: Arc::new(AtomicUsize::new(0)),
        headers: Arc::new(Mutex::new(Vec::new())),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let catalog = Arc::clone(&catalog);
            let shared = shared.clone();
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &catalog, &shared, &opts));
        }
    });
    server
}

fn handle(
    mut stream: TcpStream,
    catalog: &HashMap<String, String>,
    server: &SearchServer,
    opts: &SearchServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some((headers, body)) = read_request(&mut stream) else {
        return;
    };
    let n = server.requests.fetch_add(1, Ordering::SeqCst);
    server.headers.lock().unwrap().push(headers);

    if n < opts.fail_first {
        let _ = stream.write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(v) => answer(&v, catalog),
        Err(_) => {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            return;
        }
    };
    let bytes = payload.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        bytes.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(bytes.as_bytes());
}

fn answer(body: &Value, catalog: &HashMap<String, String>) -> Value {
    let results: Vec<Value> = body["requests"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|q| {
            let id = query_id(q["params"].as_str().unwrap_or(""));
            match catalog.get(&id) {
                Some(name) => json!({
                    "hits": [{ "objectID": "p1", "categories": [{ "id": id, "name": name }] }]
                }),
                None => json!({ "hits": [] }),
            }
        })
        .collect();
    json!({ "results": results })
}

fn query_id(params: &str) -> String {
    url::form_urlencoded::parse(params.as_bytes())
        .find(|(k, _)| k == "filters")
        .and_then(|(_, v)| v.split('"').nth(1).map(str::to_string))
        .unwrap_or_default()
}

/// Headers and body of one request. Honors `Content-Length` and `Expect: 100-continue`.
fn read_request(stream: &mut TcpStream) -> Option<(Vec<(String, String)>, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?;
    let headers: Vec<(String, String)> = head
        .lines()
        .skip(1)
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    };
    let length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    if header("expect").is_some_and(|v| v.eq_ignore_ascii_case("100-continue")) {
        let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
    }

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some((headers, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
