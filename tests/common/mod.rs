#![allow(dead_code)]

use assert_cmd::Command;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub fn cdm_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cdm-audio").unwrap();
    cmd.env_remove("CDM_AUDIO_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A few silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
pub fn silent_mp3() -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::with_capacity(FRAME_LEN * 12);
    for _ in 0..12 {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        bytes.extend_from_slice(&frame);
    }
    bytes
}

#[derive(Clone)]
struct Route {
    status: u16,
    content_type: String,
    body: Vec<u8>,
    /// Advertised length when it differs from the body (connection drops early)
    content_length: Option<usize>,
    /// Pause before each body byte
    byte_delay: Option<Duration>,
}

impl Route {
    fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Route {
            status,
            content_type: content_type.to_string(),
            body,
            content_length: None,
            byte_delay: None,
        }
    }
}

/// Canned HTTP responses keyed by request path; unknown paths get 404.
///
/// A path given several responses answers them in order, repeating the last.
#[derive(Default)]
pub struct StubSite {
    routes: HashMap<String, Vec<Route>>,
}

impl StubSite {
    pub fn new() -> Self {
        StubSite::default()
    }

    pub fn json(self, path: &str, body: serde_json::Value) -> Self {
        self.route(path, 200, "application/json", body.to_string().into_bytes())
    }

    pub fn route(self, path: &str, status: u16, content_type: &str, body: Vec<u8>) -> Self {
        self.push(path, Route::new(status, content_type, body))
    }

    /// Advertise `content_length` bytes but close after sending `body`.
    pub fn truncated(self, path: &str, content_type: &str, body: Vec<u8>, content_length: usize) -> Self {
        let mut route = Route::new(200, content_type, body);
        route.content_length = Some(content_length);
        self.push(path, route)
    }

    /// Send `body` one byte at a time, sleeping `byte_delay` before each.
    pub fn slow(self, path: &str, content_type: &str, body: Vec<u8>, byte_delay: Duration) -> Self {
        let mut route = Route::new(200, content_type, body);
        route.byte_delay = Some(byte_delay);
        self.push(path, route)
    }

    fn push(mut self, path: &str, route: Route) -> Self {
        self.routes.entry(path.to_string()).or_default().push(route);
        self
    }

    /// Serve on an ephemeral localhost port until the test process exits.
    pub fn start(self) -> RunningSite {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let mut routes = self.routes;

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                serve(stream, &mut routes, &seen);
            }
        });

        RunningSite { base, requests }
    }
}

pub struct RunningSite {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RunningSite {
    /// Paths requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Answer one request; the path is recorded before the response is sent.
fn serve(mut stream: TcpStream, routes: &mut HashMap<String, Vec<Route>>, seen: &Mutex<Vec<String>>) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }

    let path = request_line.split_whitespace().nth(1)?.to_string();
    seen.lock().unwrap().push(path.clone());
    let route = match routes.get_mut(&path) {
        Some(queue) if queue.len() > 1 => queue.remove(0),
        Some(queue) if !queue.is_empty() => queue[0].clone(),
        _ => Route::new(404, "text/plain", b"not found".to_vec()),
    };
    let reason = if route.status == 200 { "OK" } else { "Error" };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason,
        route.content_type,
        route.content_length.unwrap_or(route.body.len())
    );
    stream.write_all(head.as_bytes()).ok()?;
    match route.byte_delay {
        Some(delay) => {
            stream.flush().ok()?;
            for byte in &route.body {
                thread::sleep(delay);
                stream.write_all(&[*byte]).ok()?;
                stream.flush().ok()?;
            }
        }
        None => stream.write_all(&route.body).ok()?,
    }
    stream.flush().ok()
}
