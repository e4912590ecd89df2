use std::{io, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tower::ServiceExt;

use scoreboard_back::{
    config::{AppConfig, DEFAULT_STATE_KEY},
    dao::{
        state_store::{StateStore, memory::MemoryStateStore},
        storage::{StorageError, StorageResult},
    },
    routes,
    state::{AppState, SharedState, clock::ManualClock},
};

const T0: u64 = 1_700_000_000_000;

struct Harness {
    app: Router,
    state: SharedState,
    clock: Arc<ManualClock>,
    store: MemoryStateStore,
}

fn harness() -> Harness {
    let store = MemoryStateStore::new();
    let clock = Arc::new(ManualClock::new(T0));
    let state = AppState::new(
        Arc::new(store.clone()),
        clock.clone(),
        AppConfig::default(),
    );

    Harness {
        app: routes::router(state.clone()),
        state,
        clock,
        store,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn default_board() -> Value {
    json!({
        "scoreLeft": 0,
        "scoreRight": 0,
        "nameLeft": "PLAYER 1",
        "nameRight": "PLAYER 2",
        "timerRunning": false,
        "remainingTimeMs": 180000,
        "lastStartTimeMs": 0,
        "winnerName": null,
        "currentRemainingTimeMs": 180000,
    })
}

#[tokio::test]
async fn first_request_returns_and_persists_defaults() {
    let h = harness();

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, default_board());

    let stored = h.store.raw(DEFAULT_STATE_KEY).unwrap();
    assert_eq!(stored["remainingTimeMs"], json!(180000));
    assert!(stored.get("currentRemainingTimeMs").is_none());
}

#[tokio::test]
async fn scoring_to_ten_finishes_the_match() {
    let h = harness();

    let (_, body) = get(&h.app, "/api?start_timer=1").await;
    assert_eq!(body["timerRunning"], json!(true));
    assert_eq!(body["lastStartTimeMs"], json!(T0));

    h.clock.advance(Duration::from_secs(20));
    get(&h.app, "/api?score_kanan=2").await;
    let (_, body) = get(&h.app, "/api?score_kiri=9").await;
    assert_eq!(body["scoreLeft"], json!(9));
    assert_eq!(body["scoreRight"], json!(2));
    assert_eq!(body["currentRemainingTimeMs"], json!(160000));
    assert_eq!(body["winnerName"], Value::Null);

    h.clock.advance(Duration::from_secs(5));
    let (_, body) = get(&h.app, "/api?score_kiri=1").await;
    assert_eq!(body["scoreLeft"], json!(10));
    assert_eq!(body["winnerName"], json!("PLAYER 1"));
    assert_eq!(body["timerRunning"], json!(false));
    assert_eq!(body["remainingTimeMs"], json!(155000));

    // frozen: further commands change nothing
    let (_, after) = get(&h.app, "/api?score_kanan=3").await;
    assert_eq!(after, body);
}

#[tokio::test]
async fn clock_expiry_stops_timer_and_declares_draw() {
    let h = harness();

    get(&h.app, "/api?start_timer=1").await;
    h.clock.advance(Duration::from_millis(181_000));

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timerRunning"], json!(false));
    assert_eq!(body["remainingTimeMs"], json!(0));
    assert_eq!(body["lastStartTimeMs"], json!(0));
    assert_eq!(body["currentRemainingTimeMs"], json!(0));
    assert_eq!(body["winnerName"], json!("DRAW"));
}

#[tokio::test]
async fn reset_clears_a_finished_match() {
    let h = harness();

    get(&h.app, "/api?start_timer=1").await;
    get(&h.app, "/api?score_kanan=10").await;
    let (_, finished) = get(&h.app, "/api").await;
    assert_eq!(finished["winnerName"], json!("PLAYER 2"));

    let (_, body) = get(&h.app, "/api?reset_skor=1").await;
    assert_eq!(body, default_board());
}

#[tokio::test]
async fn score_while_paused_is_ignored() {
    let h = harness();

    let (status, body) = get(&h.app, "/api?score_kiri=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, default_board());

    let (_, body) = get(&h.app, "/api?score_kiri=banana").await;
    assert_eq!(body, default_board());
}

#[tokio::test]
async fn pause_and_resume_bank_time() {
    let h = harness();

    get(&h.app, "/api?toggle_timer=1").await;
    h.clock.advance(Duration::from_millis(42_500));
    let (_, paused) = get(&h.app, "/api?toggle_timer=1").await;
    assert_eq!(paused["timerRunning"], json!(false));
    assert_eq!(paused["remainingTimeMs"], json!(137_500));

    h.clock.advance(Duration::from_secs(600));
    let (_, still) = get(&h.app, "/api").await;
    assert_eq!(still["currentRemainingTimeMs"], json!(137_500));

    get(&h.app, "/api?start_timer=1").await;
    h.clock.advance(Duration::from_millis(7_500));
    let (_, body) = get(&h.app, "/api?stop_timer=1").await;
    assert_eq!(body["remainingTimeMs"], json!(130_000));
}

#[tokio::test]
async fn names_change_only_while_paused() {
    let h = harness();

    let (_, body) = get(&h.app, "/api?nama_kiri=Tim%20Merah&nama_kanan=Tim%20Biru").await;
    assert_eq!(body["nameLeft"], json!("Tim Merah"));
    assert_eq!(body["nameRight"], json!("Tim Biru"));

    get(&h.app, "/api?start_timer=1").await;
    let (_, body) = get(&h.app, "/api?nama_kiri=Other").await;
    assert_eq!(body["nameLeft"], json!("Tim Merah"));
}

#[tokio::test]
async fn rename_that_would_blur_the_winner_is_ignored() {
    let h = harness();

    let (status, body) = get(&h.app, "/api?nama_kiri=draw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, default_board());

    let (_, body) = get(&h.app, "/api?nama_kanan=PLAYER%201").await;
    assert_eq!(body["nameRight"], json!("PLAYER 2"));

    get(&h.app, "/api?start_timer=1").await;
    let (_, body) = get(&h.app, "/api?score_kiri=10").await;
    assert_eq!(body["winnerName"], json!("PLAYER 1"));
}

#[tokio::test]
async fn legacy_remote_parameters_work() {
    let h = harness();

    let (_, body) = get(&h.app, "/api?timer=start").await;
    assert_eq!(body["timerRunning"], json!(true));

    let (_, body) = get(&h.app, "/api?timer=pause").await;
    assert_eq!(body["timerRunning"], json!(false));

    let (_, body) = get(&h.app, "/api/scoreboard?reset_kiri=1").await;
    assert_eq!(body, default_board());
}

#[tokio::test]
async fn corrupt_stored_state_is_replaced_with_defaults() {
    let h = harness();
    h.store
        .insert(DEFAULT_STATE_KEY, json!({"skorKiri": 5, "sisaWaktu": 90}));

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, default_board());
    assert_eq!(h.store.raw(DEFAULT_STATE_KEY).unwrap()["scoreLeft"], json!(0));
}

#[tokio::test]
async fn every_request_is_broadcast_to_displays() {
    let h = harness();
    let mut receiver = h.state.scoreboard_sse().subscribe();

    get(&h.app, "/api?nama_kanan=Biru").await;

    let event = receiver.try_recv().unwrap();
    assert_eq!(event.event.as_deref(), Some("scoreboard"));
    let payload: Value = serde_json::from_str(&event.data).unwrap();
    assert_eq!(payload["nameRight"], json!("Biru"));
}

#[tokio::test]
async fn healthcheck_reports_store_status() {
    let h = harness();
    let (status, body) = get(&h.app, "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "store": "memory"}));

    let failing = failing_app(FailingStore::default());
    let (_, body) = get(&failing, "/healthcheck").await;
    assert_eq!(body["status"], json!("degraded"));
}

#[derive(Default)]
struct FailingStore {
    slow: bool,
}

impl StateStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    fn get(&self, _key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let slow = self.slow;
        Box::pin(async move {
            if slow {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Err(refused())
        })
    }

    fn set(&self, _key: &str, _value: Value) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Err(refused()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Err(refused()) })
    }
}

fn refused() -> StorageError {
    StorageError::unavailable(
        "kv unreachable".into(),
        io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
    )
}

/// Reads succeed from memory, writes are refused.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStateStore,
}

impl StateStore for ReadOnlyStore {
    fn backend(&self) -> &'static str {
        "read-only"
    }

    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: Value) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Err(refused()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}

fn failing_app(store: impl StateStore + 'static) -> Router {
    routes::router(failing_state(store))
}

fn failing_state(store: impl StateStore + 'static) -> SharedState {
    AppState::with_timeout(
        Arc::new(store),
        Arc::new(ManualClock::new(T0)),
        AppConfig::default(),
        Some(Duration::from_millis(50)),
    )
}

#[tokio::test]
async fn store_failure_returns_fallback_board_with_error() {
    let app = failing_app(FailingStore::default());

    let (status, body) = get(&app, "/api?start_timer=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["scoreLeft"], json!(0));
    assert_eq!(body["nameLeft"], json!("PLAYER 1"));
    assert_eq!(body["currentRemainingTimeMs"], json!(180000));
    assert_eq!(body["error"], json!("failed to process request"));
    assert!(
        body["details"]
            .as_str()
            .unwrap()
            .contains("connection refused")
    );
}

#[tokio::test]
async fn slow_store_times_out() {
    let app = failing_app(FailingStore { slow: true });

    let (status, body) = get(&app, "/api").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], json!("operation timed out"));
    assert_eq!(body["winnerName"], Value::Null);
}

#[tokio::test]
async fn write_failure_returns_fallback_and_broadcasts_nothing() {
    let store = ReadOnlyStore::default();
    let mut stored = serde_json::to_value(default_board()).unwrap();
    stored.as_object_mut().unwrap().remove("currentRemainingTimeMs");
    stored["scoreLeft"] = json!(3);
    store.inner.insert(DEFAULT_STATE_KEY, stored);

    let state = failing_state(store);
    let mut receiver = state.scoreboard_sse().subscribe();
    let app = routes::router(state);

    let (status, body) = get(&app, "/api?start_timer=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["scoreLeft"], json!(0));
    assert_eq!(body["timerRunning"], json!(false));
    assert_eq!(body["error"], json!("failed to process request"));
    assert_eq!(
        body["details"],
        json!("storage unavailable: kv unreachable: connection refused")
    );
    assert!(receiver.try_recv().is_err());
}
