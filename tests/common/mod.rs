//! Stand-in for the NGINX Plus status API, served from JSON fixtures.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const DEMO_BACKEND: &str = include_str!("../testdata/upstream_demo_backend.json");
const HG_BACKEND: &str = include_str!("../testdata/upstream_hg_backend.json");
const LXR_BACKEND: &str = include_str!("../testdata/upstream_lxr_backend.json");
const EMPTY_BACKEND: &str = include_str!("../testdata/upstream_empty.json");
const ZONES: &str = include_str!("../testdata/upstreams_zones.json");

/// How long `slow-backend` takes to answer.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

pub struct FakeApi {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    pub slow_completed: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// How many `slow-backend` handlers slept through and answered.
    pub fn slow_completed(&self) -> usize {
        self.slow_completed.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct FakeState {
    version: u32,
    hits: Arc<AtomicUsize>,
    slow_completed: Arc<AtomicUsize>,
}

/// Starts the fake API on an ephemeral port, answering only on `/api/{version}/...`.
pub async fn spawn_status_api(version: u32) -> FakeApi {
    let hits = Arc::new(AtomicUsize::new(0));
    let slow_completed = Arc::new(AtomicUsize::new(0));
    let state = FakeState {
        version,
        hits: hits.clone(),
        slow_completed: slow_completed.clone(),
    };
    let app = Router::new()
        .route("/api/{version}/http/upstreams", get(zones))
        .route("/api/{version}/http/upstreams/{name}", get(upstream))
        .with_state(state);
    let url = serve(app).await;
    FakeApi {
        url,
        hits,
        slow_completed,
    }
}

/// Serves `app` on 127.0.0.1 and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serves one connection with a canned raw HTTP response, then hangs up.
pub async fn serve_raw_once(response: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn json(body: &'static str) -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "application/json")],
        r#"{"error":{"status":404,"text":"upstream not found","code":"UpstreamNotFound"}}"#,
    )
        .into_response()
}

fn check_request(state: &FakeState, version: u32, headers: &HeaderMap) -> Option<Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if version != state.version {
        return Some(not_found());
    }
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if content_type != Some("application/json") {
        return Some((StatusCode::BAD_REQUEST, "missing content type").into_response());
    }
    None
}

async fn zones(
    State(state): State<FakeState>,
    Path(version): Path<u32>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejected) = check_request(&state, version, &headers) {
        return rejected;
    }
    if query.get("fields").map(String::as_str) != Some("zone") || query.len() != 1 {
        return (StatusCode::BAD_REQUEST, "expected ?fields=zone").into_response();
    }
    json(ZONES)
}

async fn upstream(
    State(state): State<FakeState>,
    Path((version, name)): Path<(u32, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejected) = check_request(&state, version, &headers) {
        return rejected;
    }
    match name.as_str() {
        "demo-backend" => json(DEMO_BACKEND),
        "hg-backend" => json(HG_BACKEND),
        "lxr-backend" => json(LXR_BACKEND),
        "empty-backend" => json(EMPTY_BACKEND),
        "broken-backend" => json("{\"peers\": [ not json"),
        "shapeless-backend" => json(r#"{"peers": "nope"}"#),
        "error-backend" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "slow-backend" => {
            tokio::time::sleep(SLOW_DELAY).await;
            state.slow_completed.fetch_add(1, Ordering::SeqCst);
            json(LXR_BACKEND)
        }
        _ => not_found(),
    }
}
