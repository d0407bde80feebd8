//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers each incoming request with the next [`Reply`] from a script
//! (repeating the last one), closes the connection, and records the raw
//! request head so tests can assert on headers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given body and content type.
    Ok(Vec<u8>, &'static str),
    /// Arbitrary status with a text body.
    Status(u16, &'static str),
    /// 302 to a path on this server.
    Redirect(&'static str),
}

pub struct ImageServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ImageServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(script: Vec<Reply>) -> ImageServer {
    assert!(!script.is_empty(), "script must not be empty");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}/", port);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    let base = base_url.clone();
    thread::spawn(move || {
        let mut index = 0usize;
        for stream in listener.incoming().flatten() {
            let reply = script[index.min(script.len() - 1)].clone();
            index += 1;
            handle(stream, &reply, &base, &seen);
        }
    });
    ImageServer { base_url, requests }
}

fn handle(mut stream: TcpStream, reply: &Reply, base: &str, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let head = match read_head(&mut stream) {
        Some(h) => h,
        None => return,
    };
    seen.lock().unwrap().push(head);

    let (status, extra, content_type, body): (String, String, &str, Vec<u8>) = match reply {
        Reply::Ok(body, ct) => ("200 OK".into(), String::new(), ct, body.clone()),
        Reply::Status(code, text) => (
            format!("{} {}", code, reason(*code)),
            String::new(),
            "text/plain",
            text.as_bytes().to_vec(),
        ),
        Reply::Redirect(path) => (
            "302 Found".into(),
            format!("Location: {}{}\r\n", base, path.trim_start_matches('/')),
            "text/plain",
            Vec::new(),
        ),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        content_type,
        body.len(),
        extra
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    if buf.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

fn reason(code: u16) -> &'static str {
    match code {
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
