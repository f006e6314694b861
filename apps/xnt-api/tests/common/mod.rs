//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use xnt_api::{ApiVersion, ClientConfig, HttpApi, ReconnectMode, RetryConfig, StreamSettings};

/// How a scripted stream connection ends once its lines are written.
#[derive(Debug, Clone, Copy)]
pub enum End {
    /// Keep the connection open until the client goes away.
    Hold,
    /// Drop the socket mid-body, without the terminating chunk.
    Drop,
    /// Write the terminating chunk, completing the response.
    Finish,
}

/// Lines written on one accepted connection.
#[derive(Debug, Clone)]
pub struct Session {
    lines: Vec<String>,
    end: End,
}

impl Session {
    /// Write `lines`, then end as `end` says.
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>, end: End) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            end,
        }
    }
}

/// Minimal HTTP/1.1 server answering every request with a chunked body of
/// newline-terminated lines. Connection `n` plays `sessions[n]`; later connections stay silent.
pub struct NdjsonServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl NdjsonServer {
    /// Bind to a random local port and start serving `sessions`.
    pub async fn start(sessions: Vec<Session>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            let mut accepted = 0_usize;
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let session = sessions
                    .get(accepted)
                    .cloned()
                    .unwrap_or_else(|| Session::new(Vec::<String>::new(), End::Hold));
                accepted += 1;
                tokio::spawn(serve(socket, session, Arc::clone(&seen)));
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Base URL to configure the client with.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Raw heads of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Drop for NdjsonServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut socket: TcpStream, session: Session, seen: Arc<Mutex<Vec<String>>>) {
    let mut head = Vec::new();
    let mut buf = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    seen.lock().push(String::from_utf8_lossy(&head).into_owned());

    let preamble = "HTTP/1.1 200 OK\r\n\
                    Content-Type: application/x-json-stream\r\n\
                    Transfer-Encoding: chunked\r\n\r\n";
    if socket.write_all(preamble.as_bytes()).await.is_err() {
        return;
    }
    for line in &session.lines {
        let data = format!("{line}\n");
        let chunk = format!("{:x}\r\n{data}\r\n", data.len());
        if socket.write_all(chunk.as_bytes()).await.is_err() {
            return;
        }
        let _ = socket.flush().await;
    }

    match session.end {
        End::Finish => {
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.flush().await;
        }
        End::Drop => {
            let _ = socket.shutdown().await;
        }
        End::Hold => while let Ok(n) = socket.read(&mut buf).await {
            if n == 0 {
                break;
            }
        },
    }
}

/// Route library logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Basic-auth client against `url`, failing fast and reconnecting at once.
pub fn api(url: &str, version: ApiVersion) -> HttpApi {
    init_tracing();
    let config = ClientConfig::basic("app-id", "access-key")
        .with_url(url)
        .with_version(version)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryConfig::none())
        .with_strict(true)
        .with_stream(
            StreamSettings::default()
                .with_strict(true)
                .with_reconnect(ReconnectMode::Immediate),
        );
    HttpApi::new(config).unwrap()
}

/// A 3.0 order payload.
pub fn order_v3(order_id: &str, status: &str) -> Value {
    json!({
        "placeTime": "2020-08-28T10:56:09.969Z",
        "orderState": {
            "lastUpdate": "2020-08-28T10:56:10.012Z",
            "status": status,
            "fills": []
        },
        "orderId": order_id,
        "orderParameters": {
            "side": "buy",
            "duration": "day",
            "quantity": "10",
            "symbolId": "AAPL.NASDAQ",
            "orderType": "limit",
            "limitPrice": "503.75"
        },
        "username": "trader",
        "currentModificationId": format!("{order_id}-mod"),
        "accountId": "ABC1234.001"
    })
}

/// A 2.0 order payload.
pub fn order_v2(id: &str, status: &str) -> Value {
    json!({
        "placeTime": "2020-08-28T10:56:09.969Z",
        "orderState": {
            "lastUpdate": "2020-08-28T10:56:10.012Z",
            "status": status,
            "fills": []
        },
        "id": id,
        "orderParameters": {
            "side": "sell",
            "duration": "good_till_cancel",
            "quantity": "5",
            "instrument": "AAPL.NASDAQ",
            "orderType": "market"
        },
        "username": "trader",
        "currentModificationId": format!("{id}-mod"),
        "accountId": "ABC1234.001"
    })
}

/// One NDJSON order event line.
pub fn order_event(order: &Value) -> String {
    json!({"event": "order", "order": order}).to_string()
}

/// One NDJSON heartbeat line.
pub fn heartbeat() -> String {
    json!({"event": "heartbeat"}).to_string()
}
