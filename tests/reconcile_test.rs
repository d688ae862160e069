// Channel frames flowing through the store into the map surface

use fleetview::animation::DASH_SEQUENCE;
use fleetview::channel::run_feed;
use fleetview::config::CoverageConfig;
use fleetview::geo::LngLat;
use fleetview::lifecycle::{run_reconciler, LayerManager};
use fleetview::map::{Camera, RecordingSurface, SharedSurface};
use fleetview::state::SnapshotStore;
use futures::stream;
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

struct Harness {
    store: Arc<SnapshotStore>,
    surface: Arc<Mutex<RecordingSurface>>,
}

fn start() -> Harness {
    let store = Arc::new(SnapshotStore::new());
    let surface = Arc::new(Mutex::new(RecordingSurface::new(Camera {
        center: LngLat(-122.1164, 47.664),
        zoom: 12.5,
        bearing: 0.0,
    })));
    let shared: SharedSurface = surface.clone();
    let manager = LayerManager::new(shared, CoverageConfig::default(), Duration::from_millis(200));

    tokio::spawn(run_reconciler(
        store.clone(),
        manager,
        Duration::from_millis(16),
    ));

    Harness { store, surface }
}

async fn feed(store: &SnapshotStore, frames: Vec<Value>) {
    let lines: Vec<io::Result<String>> = frames.into_iter().map(|f| Ok(f.to_string())).collect();
    run_feed(stream::iter(lines), store).await.unwrap();
}

/// Let the reconciler observe the pushes and paint a frame
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn stations() -> Value {
    json!({
        "event": "stations",
        "data": [{ "id": "station-1", "type": "station", "location": { "lat": 47.648, "lng": -122.111 } }]
    })
}

fn deployed(id: &str, deployed: bool, heading_name: &str, heading: (f64, f64), at: (f64, f64)) -> Value {
    json!({
        "event": "deployedDroneUpdate",
        "data": [{
            "id": id,
            "stationAssigned": "station-1",
            "status": {
                "health": "good",
                "readyToBeDeployed": false,
                "charging": false,
                "deployed": deployed,
                "batteryLife": "80%",
                "currentLocation": { "lat": at.0, "lng": at.1 },
                "headingTo": { "name": heading_name, "location": { "lat": heading.0, "lng": heading.1 } },
                "eta": "4 min"
            }
        }]
    })
}

const START: (f64, f64) = (47.648, -122.111);
const TARGET: (f64, f64) = (47.677, -122.133);

#[tokio::test(start_paused = true)]
async fn test_undeploy_removes_marker_and_path_together() {
    let h = start();
    feed(&h.store, vec![stations(), deployed("r1", true, "e1", TARGET, START)]).await;
    settle().await;

    {
        let s = h.surface.lock().await;
        assert!(s.has_marker("station-station-1"));
        assert!(s.has_marker("drone-r1"));
        assert!(s.layer("line-layer-r1").is_some());
        assert!(s.source("line-r1").is_some());
    }

    feed(&h.store, vec![deployed("r1", false, "e1", TARGET, START)]).await;
    settle().await;

    let s = h.surface.lock().await;
    assert!(!s.has_marker("drone-r1"));
    assert!(s.layer("line-layer-r1").is_none());
    assert!(s.source("line-r1").is_none());
    assert!(s.has_marker("station-station-1"));
}

#[tokio::test(start_paused = true)]
async fn test_heading_home_drops_path_but_keeps_marker() {
    let h = start();
    feed(&h.store, vec![stations(), deployed("r1", true, "e1", TARGET, START)]).await;
    settle().await;

    feed(
        &h.store,
        vec![deployed("r1", true, "station-1", (47.648, -122.111), TARGET)],
    )
    .await;
    settle().await;

    let s = h.surface.lock().await;
    assert!(s.has_marker("drone-r1"));
    assert!(s.layer("line-layer-r1").is_none());
    assert_eq!(s.marker_position("drone-r1"), Some(LngLat(TARGET.1, TARGET.0)));
}

#[tokio::test(start_paused = true)]
async fn test_path_dash_advances_over_time() {
    let h = start();
    feed(&h.store, vec![deployed("r1", true, "e1", TARGET, START)]).await;
    settle().await;

    // Two animation ticks after the initial one
    tokio::time::sleep(Duration::from_millis(400)).await;

    let s = h.surface.lock().await;
    assert_eq!(s.dash_updates("line-layer-r1"), 2);
    assert_eq!(s.dash_pattern("line-layer-r1"), Some(DASH_SEQUENCE[2]));
}

#[tokio::test(start_paused = true)]
async fn test_emergency_push_rebuilds_markers() {
    let h = start();
    let emergency = |id: &str| {
        json!({ "id": id, "type": "emergency", "location": { "lat": 47.667, "lng": -122.144 } })
    };

    feed(
        &h.store,
        vec![json!({ "event": "emergencies", "data": [emergency("e1"), emergency("e2")] })],
    )
    .await;
    settle().await;
    assert_eq!(h.surface.lock().await.marker_count(), 2);

    feed(
        &h.store,
        vec![json!({ "event": "emergencies", "data": [emergency("e3")] })],
    )
    .await;
    settle().await;

    let s = h.surface.lock().await;
    assert_eq!(s.marker_count(), 1);
    assert!(s.has_marker("emergency-e3"));
}
