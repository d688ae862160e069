use super::*;
use crate::entity::{Drone, DroneStatus, Emergency};
use crate::geo::Location;
use crate::selection::DeployCommand;
use crate::state::SnapshotStore;
use futures::stream;
use serde_json::json;
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::SplitStream;

fn frame(value: serde_json::Value) -> io::Result<String> {
    Ok(value.to_string())
}

fn stations_frame() -> serde_json::Value {
    json!({
        "event": "stations",
        "data": [
            { "id": "station-1", "type": "station", "location": { "lat": 47.648, "lng": -122.111 } },
            null
        ]
    })
}

fn command() -> DeployCommand {
    DeployCommand {
        drone: Drone {
            id: "r2".to_string(),
            station_assigned: "station-1".to_string(),
            status: DroneStatus {
                ready_to_be_deployed: true,
                ..Default::default()
            },
        },
        emergency: Emergency {
            id: "e1".to_string(),
            kind: "emergency".to_string(),
            location: Some(Location::new(47.667, -122.144)),
            notes: String::new(),
        },
    }
}

#[test]
fn test_decode_drops_null_entries() {
    let message = decode(&stations_frame().to_string()).unwrap();

    assert_eq!(message.event(), "stations");
    assert_eq!(message.len(), 1);
}

#[test]
fn test_decode_deployed_positions() {
    let message = decode(
        &json!({
            "event": "deployedDroneUpdate",
            "data": [{
                "id": "r1",
                "location": [-122.12, 47.65],
                "headingTo": { "lat": 47.667, "lng": -122.144 }
            }]
        })
        .to_string(),
    )
    .unwrap();

    match message {
        ServerMessage::DeployedDroneUpdate(updates) => {
            assert_eq!(updates.len(), 1);
            assert_eq!(updates[0].id(), "r1");
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_decode_errors() {
    assert!(matches!(decode("not json"), Err(ProtocolError::Malformed(_))));
    assert!(matches!(
        decode(r#"{"data": []}"#),
        Err(ProtocolError::Malformed(_))
    ));
    assert_eq!(
        decode(r#"{"event": "weather", "data": []}"#),
        Err(ProtocolError::UnknownEvent("weather".to_string()))
    );
    assert!(matches!(
        decode(r#"{"event": "drones", "data": {"id": "r1"}}"#),
        Err(ProtocolError::InvalidPayload { .. })
    ));
}

#[test]
fn test_apply_replaces_matching_slot() {
    let store = SnapshotStore::new();

    apply(&store, ServerMessage::Emergencies(vec![command().emergency]));
    assert_eq!(store.emergencies().unwrap().len(), 1);
    assert!(store.drones().is_none());

    apply(&store, ServerMessage::Emergencies(Vec::new()));
    assert!(store.emergencies().unwrap().is_empty());
}

#[test]
fn test_encode_deploy_command_frame() {
    let line = encode(&ClientMessage::from(command())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();

    assert_eq!(value["event"], "deployDrone");
    assert_eq!(value["data"]["drone"]["id"], "r2");
    assert_eq!(value["data"]["emergency"]["id"], "e1");
    assert!(!line.contains('\n'));
}

#[tokio::test]
async fn test_feed_applies_frames_and_skips_bad_ones() {
    let store = SnapshotStore::new();
    let frames = stream::iter(vec![
        frame(stations_frame()),
        Ok(String::new()),
        Ok("   ".to_string()),
        Ok("{garbage".to_string()),
        frame(json!({ "event": "drones", "data": [] })),
        frame(json!({ "event": "unknown", "data": [] })),
    ]);

    let summary = run_feed(frames, &store).await.unwrap();

    assert_eq!(
        summary,
        FeedSummary {
            applied: 2,
            skipped: 2,
            blank: 2,
        }
    );
    assert_eq!(store.stations().unwrap().len(), 1);
    assert!(store.drones().unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_read_error_ends_feed() {
    let store = SnapshotStore::new();
    let frames = stream::iter(vec![
        frame(stations_frame()),
        Err(io::Error::new(io::ErrorKind::Other, "connection reset")),
        frame(json!({ "event": "drones", "data": [] })),
    ]);

    let result = run_feed(frames, &store).await;

    assert!(result.is_err());
    assert!(store.stations().is_some());
    assert!(store.drones().is_none());
}

#[tokio::test]
async fn test_feed_skips_line_that_is_not_utf8() {
    let store = SnapshotStore::new();
    let mut input = Vec::new();
    input.extend_from_slice(json!({ "event": "drones", "data": [] }).to_string().as_bytes());
    input.extend_from_slice(b"\n\xff\xfe garbage\n");
    input.extend_from_slice(stations_frame().to_string().as_bytes());
    input.push(b'\n');

    let lines = SplitStream::new(BufReader::new(&input[..]).split(b'\n'));
    let summary = run_feed(lines, &store).await.unwrap();

    assert_eq!(summary.applied, 2);
    assert_eq!(summary.skipped, 1);
    assert!(store.drones().is_some());
    assert_eq!(store.stations().unwrap().len(), 1);
}

#[tokio::test]
async fn test_commands_written_as_json_lines() {
    let (sender, rx) = command_channel(8);
    sender.deploy(command()).await.unwrap();
    sender.deploy(command()).await.unwrap();
    drop(sender);

    let mut out = Vec::new();
    let written = write_commands(rx, &mut out).await.unwrap();
    assert_eq!(written, 2);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["event"], "deployDrone");
}

#[tokio::test]
async fn test_send_fails_once_receiver_dropped() {
    let (sender, rx) = command_channel(1);
    drop(rx);

    assert!(sender.deploy(command()).await.is_err());
}
