//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use backend_gateway::{GatewayConfig, HttpServer, Shutdown};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub type RequestLog = Arc<Mutex<Vec<Recorded>>>;

/// Start the mock backend API and return its address and request log.
pub async fn start_upstream() -> (SocketAddr, RequestLog) {
    let log = RequestLog::default();
    let app = Router::new().fallback(upstream).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, log)
}

async fn upstream(State(log): State<RequestLog>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    log.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers: parts.headers.clone(),
        body: body.to_vec(),
    });

    match parts.uri.path() {
        "/v1/admin/audit" => Json(json!([
            {"id": 1, "action": "policy.update", "actor": "admin"},
            {"id": 2, "action": "attestation.verify", "actor": "device-17"}
        ]))
        .into_response(),
        "/v1/admin/policies" => (
            StatusCode::CREATED,
            Json(json!({"id": 7, "received_bytes": body.len()})),
        )
            .into_response(),
        "/v1/x" => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, "https://elsewhere.invalid/y")
            .body(Body::empty())
            .unwrap(),
        "/cookies" => Response::builder()
            .header(header::SET_COOKIE, "session=abc; Path=/; HttpOnly")
            .header(header::SET_COOKIE, "theme=dark; Path=/")
            .body(Body::from("ok"))
            .unwrap(),
        "/hop" => Response::builder()
            .header("keep-alive", "timeout=5")
            .header(header::PROXY_AUTHENTICATE, "Basic realm=\"upstream\"")
            .header("trailers", "x-checksum")
            .header("x-upstream", "yes")
            .body(Body::from("hop"))
            .unwrap(),
        "/stall" => {
            tokio::time::sleep(Duration::from_secs(10)).await;
            "late".into_response()
        }
        _ => (StatusCode::OK, body).into_response(),
    }
}

/// Start a raw TCP upstream that writes `head`, then each chunk after `pause`.
pub async fn start_raw_upstream(
    head: &'static str,
    chunks: Vec<&'static str>,
    pause: Duration,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let chunks = chunks.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(head.as_bytes()).await;
                for chunk in chunks {
                    let _ = socket.write_all(chunk.as_bytes()).await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(pause).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// What a silent upstream observed on its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamEvent {
    Request,
    Closed,
}

/// Start an upstream that reads a request, never answers, and reports when
/// the gateway closes the connection.
pub async fn start_silent_upstream() -> (SocketAddr, mpsc::Receiver<UpstreamEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                if matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {
                    let _ = tx.send(UpstreamEvent::Request).await;
                }
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }
                let _ = tx.send(UpstreamEvent::Closed).await;
            });
        }
    });
    (addr, rx)
}

/// An address on which nothing is listening.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start the gateway in front of `origin` with prefix `/gateway`.
pub async fn start_gateway<F>(origin: &str, tweak: F) -> (SocketAddr, Shutdown)
where
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = GatewayConfig::default();
    config.upstream.origin = Some(origin.to_string());
    config.routing.prefix = "/gateway".into();
    config.listener.bind_address = "127.0.0.1:0".into();
    tweak(&mut config);

    let server = HttpServer::new(config).expect("valid gateway config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Caller that, like a browser in manual redirect mode, never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
