use crate::entity::{DeployedDroneUpdate, Drone};
use serde::Serialize;

/// Fleet counters for the status panel.
///
/// Each flag is counted on its own, so a unit that is both charging and
/// ready shows up under both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FleetCounts {
    pub ready: usize,
    pub charging: usize,
    pub deployed: usize,
}

impl FleetCounts {
    pub fn from_drones(drones: &[Drone]) -> Self {
        drones.iter().fold(Self::default(), |mut count, drone| {
            if drone.status.deployed {
                count.deployed += 1;
            }
            if drone.status.charging {
                count.charging += 1;
            }
            if drone.status.ready_to_be_deployed {
                count.ready += 1;
            }
            count
        })
    }
}

/// Row of the "drones deployed" panel
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedRow {
    pub id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub heading_to: Option<String>,
    pub eta: Option<String>,
}

pub fn deployed_rows(updates: &[DeployedDroneUpdate]) -> Vec<DeployedRow> {
    updates
        .iter()
        .map(|update| {
            let unit = update.tracked();
            DeployedRow {
                lat: unit.location.map(|l| l.lat),
                lng: unit.location.map(|l| l.lng),
                heading_to: unit.heading_name,
                eta: unit.eta,
                id: unit.id,
            }
        })
        .collect()
}
