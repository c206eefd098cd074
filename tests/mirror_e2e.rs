//! End-to-end tests: the full mirror against an in-process mock backend.
//!
//! The backend is a small axum app exposing the two collaborator surfaces
//! the mirror consumes (`GET /flights/{id}/seats` and the `/ws` event
//! stream), instrumented with counters so the tests can assert how often
//! the mirror fetched and when it closed the channel.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::{RwLock, broadcast};

use ams_mirror::config::MirrorConfig;
use ams_mirror::domain::{FlightId, SeatRecord, StreamEvent};
use ams_mirror::mirror::DashboardMirror;
use ams_mirror::state::ConnectionStatus;

/// One instruction to the mock event stream.
#[derive(Debug, Clone)]
enum Frame {
    /// Deliver this text frame to every connected client.
    Text(String),
    /// Drop every connected client server-side.
    Kick,
}

#[derive(Debug)]
struct Backend {
    seats: RwLock<Vec<serde_json::Value>>,
    fetch_count: AtomicUsize,
    close_count: AtomicUsize,
    fail_seats: AtomicBool,
    slow_seats: AtomicBool,
    frames: broadcast::Sender<Frame>,
}

impl Backend {
    fn send_text(&self, frame: &str) {
        let _ = self.frames.send(Frame::Text(frame.to_string()));
    }

    fn kick_clients(&self) {
        let _ = self.frames.send(Frame::Kick);
    }

    async fn set_seats(&self, seats: Vec<serde_json::Value>) {
        *self.seats.write().await = seats;
    }

    fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn closes(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

async fn seats_handler(
    Path(_flight_id): Path<i64>,
    State(backend): State<Arc<Backend>>,
) -> Response {
    backend.fetch_count.fetch_add(1, Ordering::SeqCst);
    if backend.fail_seats.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if backend.slow_seats.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    Json(backend.seats.read().await.clone()).into_response()
}

async fn ws_handler(ws: WebSocketUpgrade, State(backend): State<Arc<Backend>>) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, backend))
}

async fn run_ws(mut socket: WebSocket, backend: Arc<Backend>) {
    let mut frames = backend.frames.subscribe();
    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(Frame::Text(text)) => {
                    if socket.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(Frame::Kick) | Err(_) => break,
            },
            message = socket.recv() => match message {
                Some(Ok(Message::Close(_))) => {
                    backend.close_count.fetch_add(1, Ordering::SeqCst);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}

async fn spawn_backend(seats: Vec<serde_json::Value>) -> (Arc<Backend>, MirrorConfig) {
    let (frames, _) = broadcast::channel(256);
    let backend = Arc::new(Backend {
        seats: RwLock::new(seats),
        fetch_count: AtomicUsize::new(0),
        close_count: AtomicUsize::new(0),
        fail_seats: AtomicBool::new(false),
        slow_seats: AtomicBool::new(false),
        frames,
    });

    let app = Router::new()
        .route("/flights/{flight_id}/seats", get(seats_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let config = MirrorConfig {
        base_url: format!("http://{addr}").parse().unwrap(),
        flight_id: FlightId::new(1),
        event_log_capacity: 50,
        fetch_timeout_secs: 5,
        refresh_max_retries: 2,
        refresh_backoff_base_ms: 10,
        reconnect_backoff_base_ms: 20,
        reconnect_backoff_cap_secs: 1,
    };

    (backend, config)
}

fn seat_json(code: &str, class: &str) -> serde_json::Value {
    serde_json::json!({"id": 1, "flight_id": 1, "seat_code": code, "seat_class": class})
}

/// Polls `check` until it returns true or a five-second deadline passes.
async fn wait_for<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

/// Waits until the stream is connected and the mount-time fetch landed,
/// then lets any coalesced startup refreshes drain so fetch counts are
/// stable.
async fn settle(mirror: &DashboardMirror, backend: &Arc<Backend>) {
    let connected = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.connection() == &ConnectionStatus::Connected && view.seats().version() > 0
    })
    .await;
    assert!(connected, "mirror never settled: {backend:?}");
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn initial_snapshot_mirrors_seat_list() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();

    settle(&mirror, &backend).await;

    let view = mirror.state().snapshot().await;
    let expected = vec![SeatRecord {
        seat_code: "1A".to_string(),
        seat_class: "business".to_string(),
    }];
    assert_eq!(view.seats().records(), expected.as_slice());
    assert!(backend.fetches() >= 1);

    mirror.shutdown().await;
}

#[tokio::test]
async fn seat_event_triggers_exactly_one_refresh() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    let before = backend.fetches();
    backend
        .set_seats(vec![seat_json("1A", "business"), seat_json("2B", "economy")])
        .await;
    backend.send_text(r#"{"type":"seat_assigned","seat":"2B"}"#);

    let refreshed = wait_for(|| async {
        mirror.state().snapshot().await.seats().len() == 2
    })
    .await;
    assert!(refreshed, "seat event did not trigger a refresh");

    // Give any (incorrect) second fetch a chance to land before counting.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(backend.fetches(), before + 1);

    mirror.shutdown().await;
}

#[tokio::test]
async fn event_burst_coalesces_refreshes() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    // Make fetches slow so the burst lands while one is in flight.
    backend.slow_seats.store(true, Ordering::SeqCst);
    let before = backend.fetches();
    for seat in ["2A", "2B", "2C", "2D", "2E"] {
        backend.send_text(&serde_json::json!({"type": "seat_assigned", "seat": seat}).to_string());
    }

    let drained = wait_for(|| async {
        mirror.state().snapshot().await.events().len() >= 5
    })
    .await;
    assert!(drained, "burst never reached the log");

    // One fetch for the first trigger, at most one coalesced follow-up for
    // everything that arrived while it was in flight.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let after = backend.fetches();
    assert!(after > before, "burst triggered no refresh at all");
    assert!(
        after <= before + 2,
        "burst of 5 seat events caused {} fetches",
        after - before
    );

    mirror.shutdown().await;
}

#[tokio::test]
async fn non_seat_event_triggers_no_refresh() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    let before = backend.fetches();
    backend.send_text(r#"{"type":"other"}"#);

    let logged = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.events().latest().map(|e| e.event.event_type() == Some("other")) == Some(true)
    })
    .await;
    assert!(logged, "event never reached the log");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(backend.fetches(), before);

    mirror.shutdown().await;
}

#[tokio::test]
async fn malformed_frames_never_enter_log_or_refresh() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    let before = backend.fetches();
    backend.send_text("not json at all");
    backend.send_text("ACK:hello");
    backend.send_text(r#"{"type":"marker"}"#);

    let marker_seen = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.events().latest().map(|e| e.event.event_type() == Some("marker")) == Some(true)
    })
    .await;
    assert!(marker_seen, "marker frame never arrived");

    let view = mirror.state().snapshot().await;
    assert_eq!(view.events().len(), 1, "malformed frames entered the log");
    assert_eq!(backend.fetches(), before);

    mirror.shutdown().await;
}

#[tokio::test]
async fn event_log_keeps_newest_fifty() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    for n in 0..=50 {
        backend.send_text(&serde_json::json!({"type": "x", "n": n}).to_string());
    }

    let full = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        let newest = view.events().latest().and_then(|entry| match &entry.event {
            StreamEvent::Unknown { payload, .. } => payload.get("n").and_then(|v| v.as_i64()),
            _ => None,
        });
        view.events().len() == 50 && newest == Some(50)
    })
    .await;
    assert!(full, "log never filled with the last frame on top");

    let view = mirror.state().snapshot().await;
    let order: Vec<i64> = view
        .events()
        .iter()
        .filter_map(|entry| match &entry.event {
            StreamEvent::Unknown { payload, .. } => payload.get("n").and_then(|v| v.as_i64()),
            _ => None,
        })
        .collect();
    let expected: Vec<i64> = (1..=50).rev().collect();
    assert_eq!(order, expected, "frame 0 should be the one evicted");

    mirror.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_channel_once_and_freezes_state() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    let fetches_before = backend.fetches();
    mirror.shutdown().await;

    let closed = wait_for(|| async { backend.closes() == 1 }).await;
    assert!(closed, "backend never saw the close frame");
    assert_eq!(backend.closes(), 1);

    // Anything the backend does now must not reach the torn-down mirror.
    backend
        .set_seats(vec![seat_json("9Z", "economy")])
        .await;
    backend.send_text(r#"{"type":"seat_assigned","seat":"9Z"}"#);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(backend.fetches(), fetches_before);
}

#[tokio::test]
async fn fetch_failure_surfaces_error_then_recovers() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    backend.fail_seats.store(true, Ordering::SeqCst);
    let mirror = DashboardMirror::spawn(config).unwrap();

    let surfaced = wait_for(|| async {
        mirror.state().snapshot().await.last_refresh_error().is_some()
    })
    .await;
    assert!(surfaced, "exhausted retries never surfaced an error");

    backend.fail_seats.store(false, Ordering::SeqCst);
    mirror.request_refresh();

    let recovered = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.seats().len() == 1 && view.last_refresh_error().is_none()
    })
    .await;
    assert!(recovered, "refresh never recovered after the backend did");

    mirror.shutdown().await;
}

#[tokio::test]
async fn stream_drop_reconnects_and_resyncs() {
    let (backend, config) = spawn_backend(vec![seat_json("1A", "business")]).await;
    let mirror = DashboardMirror::spawn(config).unwrap();
    settle(&mirror, &backend).await;

    let before = backend.fetches();
    backend.kick_clients();

    let reconnected = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.connection() == &ConnectionStatus::Connected && backend.fetches() > before
    })
    .await;
    assert!(reconnected, "mirror never reconnected after the drop");

    // The reconnected stream still delivers events. Give the backend's
    // fresh subscription a moment before publishing.
    tokio::time::sleep(Duration::from_millis(100)).await;
    backend.send_text(r#"{"type":"other"}"#);
    let delivered = wait_for(|| async {
        let view = mirror.state().snapshot().await;
        view.events().latest().map(|e| e.event.event_type() == Some("other")) == Some(true)
    })
    .await;
    assert!(delivered, "events stopped flowing after reconnect");

    mirror.shutdown().await;
}
