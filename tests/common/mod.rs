//! Minimal in-process HTTP server for exercising the query client.
//! Every connection gets one canned reply; requests are recorded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the server answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// JSON body with the given status and `Content-Type`
    Json {
        status: u16,
        content_type: String,
        body: String,
    },
    /// `Transfer-Encoding: chunked` text stream, one HTTP chunk per entry
    Stream { chunks: Vec<Vec<u8>>, delay: Duration },
    /// Close the connection right after reading the request
    Hangup,
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        Self::json_as("application/json", body)
    }

    pub fn json_as(content_type: &str, body: &str) -> Self {
        MockReply::Json {
            status: 200,
            content_type: content_type.to_string(),
            body: body.to_string(),
        }
    }

    pub fn error(status: u16, body: &str) -> Self {
        MockReply::Json {
            status,
            content_type: "application/json".to_string(),
            body: body.to_string(),
        }
    }

    pub fn stream(chunks: &[&[u8]]) -> Self {
        MockReply::Stream {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            delay: Duration::from_millis(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }
}

pub struct MockServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Bind on an ephemeral port and serve `reply` to every connection
    pub async fn start(reply: MockReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self::serve(listener, reply)
    }

    /// Same as `start`, for tests that run outside a runtime (CLI tests)
    pub fn start_in_thread(reply: MockReply) -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = TcpListener::from_std(std_listener).unwrap();
                let server = MockServer::serve(listener, reply);
                tx.send((server.url.clone(), server.requests.clone())).unwrap();
                // keep the runtime alive for the accept loop
                std::future::pending::<()>().await;
            });
        });

        let (url, requests) = rx.recv().unwrap();
        MockServer { url, requests }
    }

    fn serve(listener: TcpListener, reply: MockReply) -> Self {
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let reply = reply.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = handle(stream, reply, log).await;
                });
            }
        });

        MockServer {
            url: format!("http://127.0.0.1:{port}/query"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    mut stream: TcpStream,
    reply: MockReply,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let request = read_request(&mut stream).await?;
    log.lock().unwrap().push(request);

    match reply {
        MockReply::Json {
            status,
            content_type,
            body,
        } => {
            let head = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reason(status),
                body.len()
            );
            stream.write_all(head.as_bytes()).await?;
            stream.write_all(body.as_bytes()).await?;
        }
        MockReply::Stream { chunks, delay } => {
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                )
                .await?;
            for chunk in chunks.iter().filter(|c| !c.is_empty()) {
                stream
                    .write_all(format!("{:X}\r\n", chunk.len()).as_bytes())
                    .await?;
                stream.write_all(chunk).await?;
                stream.write_all(b"\r\n").await?;
                stream.flush().await?;
                tokio::time::sleep(delay).await;
            }
            stream.write_all(b"0\r\n\r\n").await?;
        }
        MockReply::Hangup => {}
    }

    stream.flush().await?;
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body: buf[header_end..body_end].to_vec(),
    })
}
