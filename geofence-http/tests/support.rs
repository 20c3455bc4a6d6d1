//! One-shot HTTP server for exercising the transport without a real connector.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// A request as seen by [`CannedServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method from the request line.
    pub method: String,
    /// Request target from the request line.
    pub path: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Request body decoded as UTF-8.
    pub body: String,
}

/// Serves the given `(status, body)` pairs, one per connection, then stops.
pub struct CannedServer {
    /// Base URL the server listens on.
    pub base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl CannedServer {
    /// Bind a loopback listener and serve `responses` on a background thread.
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        let address = listener.local_addr().expect("listener address");
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().expect("accept connection");
                    serve_one(stream, status, &body)
                })
                .collect()
        });
        Self {
            base_url: format!("http://{address}/"),
            handle,
        }
    }

    /// Wait for every scripted response to be served.
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("server thread panicked")
    }
}

fn serve_one(stream: TcpStream, status: u16, body: &str) -> RecordedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("read request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let path = parts.next().unwrap_or_default().to_owned();

    let mut content_length = 0_usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().expect("numeric content length");
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.to_owned());
            }
        }
    }
    let mut raw_body = vec![0_u8; content_length];
    reader.read_exact(&mut raw_body).expect("read body");

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .expect("write response");
    stream.flush().expect("flush response");

    RecordedRequest {
        method,
        path,
        authorization,
        body: String::from_utf8(raw_body).expect("utf-8 body"),
    }
}
