//! Minimal HTTP/1.1 server for fetch integration tests.
//!
//! Serves a single static body on GET and counts hits, with fault injection:
//! error statuses, missing Content-Length, and mid-body truncation (declared
//! length sent in full, connection closed early).

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// HTTP status for every response.
    pub status: u32,
    /// If false, omit Content-Length (client must read until close).
    pub send_content_length: bool,
    /// If set, send only this many body bytes and then close the connection,
    /// while still declaring the full length.
    pub truncate_body_at: Option<usize>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            send_content_length: true,
            truncate_body_at: None,
        }
    }
}

/// Handle to a running test server.
pub struct TestServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Number of requests the server has answered.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads received so far (request line plus headers), in
    /// arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. Returns a handle
/// with the base URL (e.g. "http://127.0.0.1:12345/file.zip"). The server
/// runs until the process exits.
pub fn start(body: Vec<u8>) -> TestServer {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let hits_server = Arc::clone(&hits);
    let requests_server = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_server);
            let requests = Arc::clone(&requests_server);
            thread::spawn(move || handle(stream, &body, opts, &hits, &requests));
        }
    });
    TestServer {
        url: format!("http://127.0.0.1:{}/file.zip", port),
        hits,
        requests,
    }
}

/// URL that refuses connections (bound port released before use).
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/file.zip", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: ServerOptions,
    hits: &AtomicUsize,
    requests: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    hits.fetch_add(1, Ordering::SeqCst);
    if let Ok(head) = std::str::from_utf8(&buf[..n]) {
        requests.lock().unwrap().push(head.to_string());
    }

    let reason = match opts.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let content_length = if opts.send_content_length {
        format!("Content-Length: {}\r\n", body.len())
    } else {
        String::new()
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\n{}Connection: close\r\n\r\n",
        opts.status, reason, content_length
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }

    let to_send = match opts.truncate_body_at {
        Some(n) => &body[..n.min(body.len())],
        None => body,
    };
    let _ = stream.write_all(to_send);
    let _ = stream.flush();
    let _ = stream.shutdown(Shutdown::Both);
}
