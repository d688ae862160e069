use crate::entity::{skip_nulls, DeployedDroneUpdate, Drone, Emergency, Station};
use crate::selection::DeployCommand;
use crate::state::SnapshotStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Server → Client: full snapshot pushes, one event per entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "stations")]
    Stations(#[serde(deserialize_with = "skip_nulls")] Vec<Station>),
    #[serde(rename = "drones")]
    Drones(#[serde(deserialize_with = "skip_nulls")] Vec<Drone>),
    #[serde(rename = "emergencies")]
    Emergencies(#[serde(deserialize_with = "skip_nulls")] Vec<Emergency>),
    #[serde(rename = "deployedDroneUpdate")]
    DeployedDroneUpdate(#[serde(deserialize_with = "skip_nulls")] Vec<DeployedDroneUpdate>),
}

const SERVER_EVENTS: [&str; 4] = ["stations", "drones", "emergencies", "deployedDroneUpdate"];

impl ServerMessage {
    pub fn event(&self) -> &'static str {
        match self {
            ServerMessage::Stations(_) => "stations",
            ServerMessage::Drones(_) => "drones",
            ServerMessage::Emergencies(_) => "emergencies",
            ServerMessage::DeployedDroneUpdate(_) => "deployedDroneUpdate",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ServerMessage::Stations(items) => items.len(),
            ServerMessage::Drones(items) => items.len(),
            ServerMessage::Emergencies(items) => items.len(),
            ServerMessage::DeployedDroneUpdate(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Client → Server commands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "deployDrone")]
    DeployDrone(DeployCommand),
}

impl From<DeployCommand> for ClientMessage {
    fn from(command: DeployCommand) -> Self {
        ClientMessage::DeployDrone(command)
    }
}

/// Frame decoding failures
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Not a JSON object with a string `event`
    Malformed(String),
    UnknownEvent(String),
    InvalidPayload { event: String, reason: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(reason) => write!(f, "malformed frame: {}", reason),
            ProtocolError::UnknownEvent(event) => write!(f, "unknown event '{}'", event),
            ProtocolError::InvalidPayload { event, reason } => {
                write!(f, "invalid '{}' payload: {}", event, reason)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Decode one `{"event", "data"}` frame
pub fn decode(frame: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let event = value
        .get("event")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing event name".to_string()))?
        .to_string();

    if !SERVER_EVENTS.contains(&event.as_str()) {
        return Err(ProtocolError::UnknownEvent(event));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        event,
        reason: e.to_string(),
    })
}

/// Encode an outbound command as a single-line frame
pub fn encode(message: &ClientMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

/// Replace the matching store slot with the pushed list
pub fn apply(store: &SnapshotStore, message: ServerMessage) {
    match message {
        ServerMessage::Stations(stations) => store.replace_stations(stations),
        ServerMessage::Drones(drones) => store.replace_drones(drones),
        ServerMessage::Emergencies(emergencies) => store.replace_emergencies(emergencies),
        ServerMessage::DeployedDroneUpdate(updates) => store.replace_deployed(updates),
    }
}
