//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a fixed set of paths; anything else is 404. Every request is logged
//! so tests can assert on the ranges curl actually sent. One request per
//! connection (`Connection: close`).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeServerOptions {
    /// The first N GETs send a full Content-Length but only half the body, then close.
    pub truncate_first_gets: usize,
    /// HEAD answers without Content-Length.
    pub omit_head_length: bool,
    /// GET ignores Range and always returns 200 with the full body.
    pub ignore_ranges: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Start of `Range: bytes=<start>-`, if sent.
    pub range_start: Option<u64>,
}

pub struct RangeServer {
    pub base_url: String,
    log: Arc<Mutex<Vec<Request>>>,
}

impl RangeServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    /// Range starts of the GETs for `path`, in arrival order (None = no Range header).
    pub fn get_ranges(&self, path: &str) -> Vec<Option<u64>> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET" && r.path == path)
            .map(|r| r.range_start)
            .collect()
    }
}

/// Starts a server in a background thread serving `files` (path -> body).
/// The server runs until the process exits.
pub fn start(files: Vec<(&str, Vec<u8>)>) -> RangeServer {
    start_with_options(files, RangeServerOptions::default())
}

pub fn start_with_options(files: Vec<(&str, Vec<u8>)>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let files: Arc<HashMap<String, Vec<u8>>> = Arc::new(
        files
            .into_iter()
            .map(|(p, b)| (p.to_string(), b))
            .collect(),
    );
    let log = Arc::new(Mutex::new(Vec::new()));
    let gets = Arc::new(AtomicUsize::new(0));
    let server_log = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let files = Arc::clone(&files);
            let log = Arc::clone(&server_log);
            let gets = Arc::clone(&gets);
            thread::spawn(move || handle(stream, &files, &log, &gets, opts));
        }
    });
    RangeServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        log,
    }
}

fn handle(
    mut stream: TcpStream,
    files: &HashMap<String, Vec<u8>>,
    log: &Mutex<Vec<Request>>,
    gets: &AtomicUsize,
    opts: RangeServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => parse_request(s),
        Err(_) => return,
    };
    log.lock().unwrap().push(request.clone());

    let body = match files.get(&request.path) {
        Some(b) => b.as_slice(),
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\n",
            );
            if request.method == "GET" {
                let _ = stream.write_all(b"not found");
            }
            return;
        }
    };
    let total = body.len() as u64;

    if request.method == "HEAD" {
        let length = if opts.omit_head_length {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", total)
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\n{}Accept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            length
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if request.method != "GET" {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let (status, content_range, slice) = match request.range_start {
        Some(start) if !opts.ignore_ranges => {
            if start >= total && total > 0 {
                ("416 Range Not Satisfiable", format!("bytes */{}", total), &body[0..0])
            } else {
                let start = start.min(total) as usize;
                (
                    "206 Partial Content",
                    format!("bytes {}-{}/{}", start, total.saturating_sub(1), total),
                    &body[start..],
                )
            }
        }
        _ => (
            "200 OK",
            format!("bytes 0-{}/{}", total.saturating_sub(1), total),
            body,
        ),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Range: {}\r\nConnection: close\r\n\r\n",
        status,
        slice.len(),
        content_range
    );
    let _ = stream.write_all(response.as_bytes());

    let nth = gets.fetch_add(1, Ordering::SeqCst);
    if nth < opts.truncate_first_gets {
        let _ = stream.write_all(&slice[..slice.len() / 2]);
        let _ = stream.flush();
        return;
    }
    let _ = stream.write_all(slice);
}

fn parse_request(request: &str) -> Request {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_ascii_uppercase();
    let path = first.next().unwrap_or("/").to_string();
    let mut range_start = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim().to_ascii_lowercase();
                if let Some(ranges) = value.strip_prefix("bytes=") {
                    range_start = ranges
                        .split_once('-')
                        .and_then(|(a, _)| a.trim().parse::<u64>().ok());
                }
            }
        }
    }
    Request {
        method,
        path,
        range_start,
    }
}
