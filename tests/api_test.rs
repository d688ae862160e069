// Integration tests for the operator API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fleetview::api::{create_router, ApiState};
use fleetview::channel::{apply, command_channel, decode, ClientMessage};
use fleetview::config::ViewportConfig;
use fleetview::console::OperatorConsole;
use fleetview::map::{RecordingSurface, SharedSurface};
use fleetview::state::SnapshotStore;
use fleetview::viewport::ViewportController;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<SnapshotStore>,
    commands: mpsc::Receiver<ClientMessage>,
}

fn create_test_app() -> TestApp {
    let store = Arc::new(SnapshotStore::new());
    let (sender, commands) = command_channel(16);
    let config = ViewportConfig::default();
    let surface: SharedSurface = Arc::new(Mutex::new(RecordingSurface::new(
        ViewportController::initial_camera(&config),
    )));
    let console = OperatorConsole::new(
        store.clone(),
        sender,
        ViewportController::new(surface, config),
        Duration::ZERO,
    );

    TestApp {
        router: create_router(Arc::new(ApiState {
            console: Arc::new(console),
        })),
        store,
        commands,
    }
}

fn push(store: &SnapshotStore, frame: Value) {
    apply(store, decode(&frame.to_string()).unwrap());
}

fn seed(store: &SnapshotStore) {
    let drone = |id: &str, ready: bool| {
        json!({
            "id": id,
            "stationAssigned": "station-1",
            "status": {
                "health": "good",
                "readyToBeDeployed": ready,
                "charging": !ready,
                "deployed": false,
                "batteryLife": "90%",
                "currentLocation": { "lat": 47.648351, "lng": -122.111187 }
            }
        })
    };

    push(
        store,
        json!({ "event": "drones", "data": [drone("r1", true), drone("r2", false)] }),
    );
    push(
        store,
        json!({
            "event": "emergencies",
            "data": [{
                "id": "e1",
                "type": "emergency",
                "location": { "lat": 47.667, "lng": -122.144 },
                "notes": "Hiker injured"
            }]
        }),
    );
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// GET /api/fleet before any push reports zeros and the initial readout.
#[tokio::test]
async fn test_fleet_defaults() {
    let app = create_test_app();

    let (status, body) = send(&app.router, "GET", "/api/fleet", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["ready"], 0);
    assert_eq!(body["deployed"], json!([]));
    assert_eq!(
        body["readout"],
        "Longitude: -122.1164 | Latitude: 47.6640 | Zoom: 12.50"
    );
}

#[tokio::test]
async fn test_emergency_list() {
    let app = create_test_app();
    let (_, body) = send(&app.router, "GET", "/api/emergencies", None).await;
    assert_eq!(body, json!([]));

    seed(&app.store);
    let (status, body) = send(&app.router, "GET", "/api/emergencies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "e1");
    assert_eq!(body[0]["type"], "emergency");
}

/// Full deployment flow emits exactly one deployDrone command.
#[tokio::test]
async fn test_selection_flow_emits_deploy() {
    let mut app = create_test_app();
    seed(&app.store);

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/selection",
        Some(json!({ "emergencyId": "e1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emergencyId"], "e1");
    assert_eq!(body["candidates"][0]["drone"]["id"], "r1");
    assert_eq!(body["candidates"][0]["selectable"], true);
    assert_eq!(body["canConfirm"], false);

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/selection/pick",
        Some(json!({ "droneId": "r1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canConfirm"], true);

    let (status, body) = send(&app.router, "POST", "/api/selection/confirm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drone"]["id"], "r1");
    assert_eq!(body["emergency"]["id"], "e1");

    let (status, _) = send(&app.router, "POST", "/api/selection/confirm", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ClientMessage::DeployDrone(command) = app.commands.recv().await.unwrap();
    assert_eq!(command.drone_id(), "r1");
    assert!(app.commands.try_recv().is_err());
}

#[tokio::test]
async fn test_selection_query_filters_candidates() {
    let app = create_test_app();
    seed(&app.store);
    send(
        &app.router,
        "POST",
        "/api/selection",
        Some(json!({ "emergencyId": "e1" })),
    )
    .await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/selection/query",
        Some(json!({ "query": "R2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "R2");
    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["drone"]["id"], "r2");
}

#[tokio::test]
async fn test_selection_error_statuses() {
    let app = create_test_app();
    seed(&app.store);

    let (status, body) = send(&app.router, "GET", "/api/selection", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/selection",
        Some(json!({ "emergencyId": "e9" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app.router,
        "POST",
        "/api/selection",
        Some(json!({ "emergencyId": "e1" })),
    )
    .await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/selection/pick",
        Some(json!({ "droneId": "r2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/selection/pick",
        Some(json!({ "droneId": "r9" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, "POST", "/api/selection/confirm", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_selection() {
    let app = create_test_app();
    seed(&app.store);
    send(
        &app.router,
        "POST",
        "/api/selection",
        Some(json!({ "emergencyId": "e1" })),
    )
    .await;

    let (status, _) = send(&app.router, "DELETE", "/api/selection", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, "DELETE", "/api/selection", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewport_routes() {
    let app = create_test_app();
    seed(&app.store);

    let (status, body) = send(&app.router, "POST", "/api/viewport/emergency/e1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["camera"]["zoom"], 14.5);
    assert_eq!(
        body["readout"],
        "Longitude: -122.1440 | Latitude: 47.6670 | Zoom: 14.50"
    );

    let (status, body) = send(&app.router, "POST", "/api/viewport/drone/r1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["camera"]["zoom"], 16.0);

    let (status, _) = send(&app.router, "POST", "/api/viewport/drone/r9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, "POST", "/api/viewport/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["camera"]["zoom"], 12.5);

    let (status, body) = send(&app.router, "GET", "/api/viewport", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["camera"]["center"], json!([-122.1164, 47.664]));
}
