use crate::geo::{LngLat, Location};
use serde::{Deserialize, Deserializer, Serialize};


/// Fixed station (home base) for a group of drones
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: Location,
}

/// Active incident report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    #[default]
    Good,
    Warning,
    Bad,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Good => "good",
            Health::Warning => "warning",
            Health::Bad => "bad",
        }
    }
}

/// Named destination a unit is flying toward
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingTo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneStatus {
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub ready_to_be_deployed: bool,
    #[serde(default)]
    pub charging: bool,
    #[serde(default)]
    pub deployed: bool,
    #[serde(default)]
    pub battery_life: String,
    #[serde(default)]
    pub current_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_to: Option<HeadingTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_speed: Option<f64>,
}

impl DroneStatus {
    /// Badge shown next to a unit: ready, then deployed, then charging, then raw health
    pub fn badge(&self) -> StatusBadge {
        if self.ready_to_be_deployed {
            StatusBadge::Ready
        } else if self.deployed {
            StatusBadge::Deployed
        } else if self.charging {
            StatusBadge::Charging
        } else {
            StatusBadge::Health(self.health)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "badge", content = "health")]
pub enum StatusBadge {
    Ready,
    Deployed,
    Charging,
    Health(Health),
}

impl StatusBadge {
    pub fn label(&self) -> &'static str {
        match self {
            StatusBadge::Ready => "Ready to fly",
            StatusBadge::Deployed => "Deployed",
            StatusBadge::Charging => "Charging",
            StatusBadge::Health(health) => health.as_str(),
        }
    }
}

/// Full drone record as pushed on the `drones` channel event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    pub id: String,
    pub station_assigned: String,
    pub status: DroneStatus,
}

impl Drone {
    pub fn is_ready(&self) -> bool {
        self.status.ready_to_be_deployed
    }
}

/// Narrow live-position payload: `location` is `[lng, lat]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedDroneLocation {
    pub id: String,
    pub location: LngLat,
    pub heading_to: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed: Option<bool>,
}

/// One entry of a `deployedDroneUpdate` push.
///
/// Producers send either full drone records or the narrow position payload;
/// the two shapes are told apart structurally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeployedDroneUpdate {
    Drone(Drone),
    Position(DeployedDroneLocation),
}

impl DeployedDroneUpdate {
    pub fn id(&self) -> &str {
        match self {
            DeployedDroneUpdate::Drone(drone) => &drone.id,
            DeployedDroneUpdate::Position(position) => &position.id,
        }
    }

    /// Normalise either payload shape into the fields reconciliation needs
    pub fn tracked(&self) -> TrackedUnit {
        match self {
            DeployedDroneUpdate::Drone(drone) => TrackedUnit {
                id: drone.id.clone(),
                station_assigned: Some(drone.station_assigned.clone()),
                deployed: drone.status.deployed,
                location: drone.status.current_location,
                heading_name: drone.status.heading_to.as_ref().map(|h| h.name.clone()),
                heading_location: drone.status.heading_to.as_ref().and_then(|h| h.location),
                eta: drone.status.eta.clone(),
            },
            DeployedDroneUpdate::Position(position) => TrackedUnit {
                id: position.id.clone(),
                station_assigned: None,
                deployed: position.deployed.unwrap_or(true),
                location: Some(Location::from(position.location)),
                heading_name: None,
                heading_location: Some(position.heading_to),
                eta: None,
            },
        }
    }
}

/// Live view of one unit, independent of which payload shape carried it
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedUnit {
    pub id: String,
    pub station_assigned: Option<String>,
    pub deployed: bool,
    pub location: Option<Location>,
    pub heading_name: Option<String>,
    pub heading_location: Option<Location>,
    pub eta: Option<String>,
}

impl TrackedUnit {
    /// True when the unit is flying back to its own station.
    ///
    /// Matches on the heading name, or on the heading location equalling the
    /// assigned station's location when the station list is known.
    pub fn is_heading_home(&self, stations: Option<&[Station]>) -> bool {
        let Some(station_id) = self.station_assigned.as_deref() else {
            return false;
        };

        if self.heading_name.as_deref() == Some(station_id) {
            return true;
        }

        match (self.heading_location, stations) {
            (Some(target), Some(stations)) => stations
                .iter()
                .any(|s| s.id == station_id && s.location == target),
            _ => false,
        }
    }

    /// Whether this unit should currently carry an animated path layer
    pub fn wants_path(&self, stations: Option<&[Station]>) -> bool {
        self.deployed && self.heading_location.is_some() && !self.is_heading_home(stations)
    }
}

/// Camera command: `[lng, lat]` plus zoom level
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomTarget {
    pub location: LngLat,
    pub zoom: f64,
}

impl ZoomTarget {
    pub fn new(location: LngLat, zoom: f64) -> Self {
        Self { location, zoom }
    }

    pub fn for_emergency(emergency: &Emergency, zoom: f64) -> Option<Self> {
        emergency.location.map(|loc| Self::new(loc.into(), zoom))
    }

    pub fn for_drone(drone: &Drone, zoom: f64) -> Option<Self> {
        drone
            .status
            .current_location
            .map(|loc| Self::new(loc.into(), zoom))
    }
}

/// Deserialize a channel list, dropping `null` entries.
///
/// # Examples
///
/// ```
/// use fleetview::entity::{skip_nulls, Station};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Push {
///     #[serde(deserialize_with = "skip_nulls")]
///     stations: Vec<Station>,
/// }
///
/// let push: Push = serde_json::from_str(
///     r#"{"stations": [null, {"id": "station-1", "type": "station", "location": {"lat": 47.6, "lng": -122.1}}]}"#,
/// ).unwrap();
/// assert_eq!(push.stations.len(), 1);
/// ```
pub fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Vec<Option<T>> = Vec::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().collect())
}
