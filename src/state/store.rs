use crate::entity::{DeployedDroneUpdate, Drone, Emergency, Station};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// One received collection, shared cheaply between readers
#[derive(Debug)]
pub struct Snapshot<T> {
    pub items: Arc<Vec<T>>,
    pub received_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            received_at: Utc::now(),
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            received_at: self.received_at,
        }
    }
}

/// Slot value: `None` until the first push of that kind arrives
pub type Slot<T> = Option<Snapshot<T>>;

/// Latest known stations, drones, emergencies and live drone positions.
///
/// Each slot is an independent watch channel. A push replaces the whole
/// slot and marks every receiver changed; nothing is merged and no slot
/// ever touches another.
pub struct SnapshotStore {
    stations: watch::Sender<Slot<Station>>,
    drones: watch::Sender<Slot<Drone>>,
    emergencies: watch::Sender<Slot<Emergency>>,
    deployed: watch::Sender<Slot<DeployedDroneUpdate>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            stations: watch::channel(None).0,
            drones: watch::channel(None).0,
            emergencies: watch::channel(None).0,
            // Live positions start as an empty list rather than absent
            deployed: watch::channel(Some(Snapshot::new(Vec::new()))).0,
        }
    }

    pub fn replace_stations(&self, stations: Vec<Station>) {
        debug!(count = stations.len(), "Replacing station snapshot");
        self.stations.send_replace(Some(Snapshot::new(stations)));
    }

    pub fn replace_drones(&self, drones: Vec<Drone>) {
        debug!(count = drones.len(), "Replacing drone snapshot");
        self.drones.send_replace(Some(Snapshot::new(drones)));
    }

    pub fn replace_emergencies(&self, emergencies: Vec<Emergency>) {
        debug!(count = emergencies.len(), "Replacing emergency snapshot");
        self.emergencies.send_replace(Some(Snapshot::new(emergencies)));
    }

    pub fn replace_deployed(&self, updates: Vec<DeployedDroneUpdate>) {
        debug!(count = updates.len(), "Replacing deployed drone positions");
        self.deployed.send_replace(Some(Snapshot::new(updates)));
    }

    pub fn stations(&self) -> Option<Arc<Vec<Station>>> {
        items(&self.stations)
    }

    pub fn drones(&self) -> Option<Arc<Vec<Drone>>> {
        items(&self.drones)
    }

    pub fn emergencies(&self) -> Option<Arc<Vec<Emergency>>> {
        items(&self.emergencies)
    }

    /// Live positions; empty until the first `deployedDroneUpdate`
    pub fn deployed(&self) -> Arc<Vec<DeployedDroneUpdate>> {
        items(&self.deployed).unwrap_or_default()
    }

    pub fn drones_snapshot(&self) -> Slot<Drone> {
        self.drones.borrow().clone()
    }

    pub fn emergencies_snapshot(&self) -> Slot<Emergency> {
        self.emergencies.borrow().clone()
    }

    pub fn drone(&self, id: &str) -> Option<Drone> {
        self.drones()?.iter().find(|d| d.id == id).cloned()
    }

    pub fn emergency(&self, id: &str) -> Option<Emergency> {
        self.emergencies()?.iter().find(|e| e.id == id).cloned()
    }

    pub fn subscribe_stations(&self) -> watch::Receiver<Slot<Station>> {
        self.stations.subscribe()
    }

    pub fn subscribe_drones(&self) -> watch::Receiver<Slot<Drone>> {
        self.drones.subscribe()
    }

    pub fn subscribe_emergencies(&self) -> watch::Receiver<Slot<Emergency>> {
        self.emergencies.subscribe()
    }

    pub fn subscribe_deployed(&self) -> watch::Receiver<Slot<DeployedDroneUpdate>> {
        self.deployed.subscribe()
    }

    /// Reset every slot to its initial state (session teardown)
    pub fn clear(&self) {
        self.stations.send_replace(None);
        self.drones.send_replace(None);
        self.emergencies.send_replace(None);
        self.deployed.send_replace(Some(Snapshot::new(Vec::new())));
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn items<T>(tx: &watch::Sender<Slot<T>>) -> Option<Arc<Vec<T>>> {
    tx.borrow().as_ref().map(|s| Arc::clone(&s.items))
}
