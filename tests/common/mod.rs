//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use multichain_verify::config::schema::FlowConfig;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Config pointing at this backend with short timeouts.
    pub fn config(&self) -> FlowConfig {
        let mut config = FlowConfig::default();
        config.backend.base_url = self.base_url();
        config.backend.request_timeout_secs = 5;
        config.backend.connect_timeout_secs = 2;
        config
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path (without the `/api` prefix) and JSON body,
/// and returns the status code and response body.
pub async fn start_programmable_backend<F>(f: F) -> MockBackend
where
    F: Fn(&str, &Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref(), &recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Mock backend that answers every endpoint from a fixed table.
pub async fn start_presale_backend(connect: Value, execute_status: impl Fn(&Value) -> u16 + Send + Sync + 'static) -> MockBackend {
    start_programmable_backend(move |path, body| match path {
        "/presale/connect" => (200, json_ok(connect.clone())),
        "/presale/prepare-flow" => (
            200,
            json_ok(serde_json::json!({"transactions": [{"chain": "Ethereum", "kind": "attest"}]})),
        ),
        "/presale/execute-flow" => {
            let status = execute_status(body);
            (status, serde_json::json!({"success": status == 200}).to_string())
        }
        "/presale/claim" => (200, serde_json::json!({"success": true}).to_string()),
        _ => (404, String::new()),
    })
    .await
}

pub fn json_ok(data: Value) -> String {
    serde_json::json!({"success": true, "data": data}).to_string()
}

pub fn eligible_connect() -> Value {
    serde_json::json!({
        "isEligible": true,
        "tokenAllocation": {"amount": "5000", "valueUSD": "850"},
        "rawData": [
            {"chain": "Ethereum", "amount": "1.2", "valueUSD": 3000.0, "symbol": "ETH"},
            {"chain": "Polygon", "amount": 50, "valueUSD": "40.5"}
        ]
    })
}

pub fn ineligible_connect() -> Value {
    serde_json::json!({"isEligible": false, "rawData": []})
}

async fn serve_one<F>(
    mut socket: TcpStream,
    f: &F,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> (u16, String),
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let path = target.strip_prefix("/api").unwrap_or(&target).to_string();
    let end = buf.len().min(body_start + content_length);
    let body: Value = serde_json::from_slice(&buf[body_start.min(end)..end]).unwrap_or(Value::Null);

    let (status, response) = f(&path, &body);
    recorded.lock().unwrap().push(RecordedRequest { path, body });

    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response_str = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        response.len(),
        response
    );
    socket.write_all(response_str.as_bytes()).await?;
    socket.shutdown().await
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
