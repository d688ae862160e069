// Deployment candidate selection: ranking, debounced search, confirmation

use crate::entity::{Drone, Emergency, StatusBadge};
use crate::geo::display_distance;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};


/// One unit offered for an incident
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub drone: Drone,
    /// Great-circle miles to the incident, two decimals; 0 when a location is unknown
    pub distance_miles: f64,
    pub badge: StatusBadge,
    pub selectable: bool,
}

/// Outbound request to send `drone` to `emergency`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeployCommand {
    pub drone: Drone,
    pub emergency: Emergency,
}

impl DeployCommand {
    pub fn drone_id(&self) -> &str {
        &self.drone.id
    }

    pub fn emergency_id(&self) -> &str {
        &self.emergency.id
    }
}

/// Selection rule violations
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    NoIncident,
    UnknownDrone(String),
    NotReady(String),
    NothingSelected,
    Closed,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NoIncident => write!(f, "no incident selected"),
            SelectionError::UnknownDrone(id) => write!(f, "unknown drone '{}'", id),
            SelectionError::NotReady(id) => write!(f, "drone '{}' is not ready to be deployed", id),
            SelectionError::NothingSelected => write!(f, "no drone selected"),
            SelectionError::Closed => write!(f, "selection is closed"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Rank `drones` for `emergency`: ready units first, snapshot order otherwise kept.
///
/// A missing incident or drone list yields no candidates.
pub fn rank_candidates(emergency: Option<&Emergency>, drones: Option<&[Drone]>) -> Vec<Candidate> {
    let (Some(emergency), Some(drones)) = (emergency, drones) else {
        return Vec::new();
    };

    let mut candidates: Vec<Candidate> = drones
        .iter()
        .map(|drone| Candidate {
            distance_miles: display_distance(drone.status.current_location, emergency.location),
            badge: drone.status.badge(),
            selectable: drone.is_ready(),
            drone: drone.clone(),
        })
        .collect();

    // Stable sort keeps snapshot order within each group
    candidates.sort_by_key(|c| !c.drone.is_ready());
    candidates
}

/// Case-insensitive id substring match; blank queries match everything
pub fn filter_candidates<'a>(candidates: &'a [Candidate], query: &str) -> Vec<&'a Candidate> {
    if query.trim().is_empty() {
        return candidates.iter().collect();
    }

    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|c| c.drone.id.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug)]
struct PendingQuery {
    query: String,
    due: Instant,
}

/// Transient state of one "deploy a drone to this incident" session
#[derive(Debug)]
pub struct DeploymentSelector {
    emergency: Option<Emergency>,
    candidates: Vec<Candidate>,
    query: String,
    pending: Option<PendingQuery>,
    selected: Option<String>,
    debounce: Duration,
    open: bool,
}

impl DeploymentSelector {
    pub fn open(emergency: Option<Emergency>, drones: Option<&[Drone]>, debounce: Duration) -> Self {
        let candidates = rank_candidates(emergency.as_ref(), drones);
        debug!(
            emergency_id = ?emergency.as_ref().map(|e| e.id.as_str()),
            candidates = candidates.len(),
            "Deployment selection opened"
        );

        Self {
            emergency,
            candidates,
            query: String::new(),
            pending: None,
            selected: None,
            debounce,
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn emergency(&self) -> Option<&Emergency> {
        self.emergency.as_ref()
    }

    /// Re-rank against a fresh drone snapshot; query and selection are kept
    pub fn refresh(&mut self, drones: Option<&[Drone]>) {
        if self.open {
            self.candidates = rank_candidates(self.emergency.as_ref(), drones);
        }
    }

    /// Applied search text (not counting a debounced query still pending)
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_pending_query(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending query becomes due, if one is waiting
    pub fn pending_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Record a keystroke; the filter changes once the debounce window passes
    pub fn type_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.debounce.is_zero() {
            self.set_query(query);
            return;
        }
        self.pending = Some(PendingQuery {
            query,
            due: Instant::now() + self.debounce,
        });
    }

    /// Apply the pending query if its window has elapsed at `now`
    pub fn apply_due(&mut self, now: Instant) -> bool {
        match self.pending.take() {
            Some(pending) if pending.due <= now => {
                self.query = pending.query;
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Wait out the debounce window and apply the pending query
    pub async fn settle(&mut self) -> bool {
        if let Some(pending) = &self.pending {
            sleep_until(pending.due).await;
        }
        self.apply_due(Instant::now())
    }

    /// Apply a query immediately, discarding any pending one
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.pending = None;
        self.query = query.into();
    }

    /// Visible candidates under the applied query
    pub fn candidates(&self) -> Vec<&Candidate> {
        filter_candidates(&self.candidates, &self.query)
    }

    pub fn all_candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Pick a unit; only ready units may be chosen
    pub fn select(&mut self, drone_id: &str) -> Result<(), SelectionError> {
        if !self.open {
            return Err(SelectionError::Closed);
        }

        let candidate = self
            .candidates
            .iter()
            .find(|c| c.drone.id == drone_id)
            .ok_or_else(|| SelectionError::UnknownDrone(drone_id.to_string()))?;

        if !candidate.selectable {
            return Err(SelectionError::NotReady(drone_id.to_string()));
        }

        self.selected = Some(drone_id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn can_confirm(&self) -> bool {
        self.open && self.selected.is_some()
    }

    /// Turn the selection into a deploy command and close the session.
    pub fn confirm(&mut self, latest: Option<&[Drone]>) -> Result<DeployCommand, SelectionError> {
        let command = self.command(latest)?;
        self.close();
        Ok(command)
    }

    /// Build the deploy command for the current pick, leaving the session open.
    ///
    /// Readiness is checked again against `latest`, since a snapshot may
    /// have arrived after the pick. A unit that is no longer ready or no
    /// longer present is unpicked.
    pub fn command(&mut self, latest: Option<&[Drone]>) -> Result<DeployCommand, SelectionError> {
        if !self.open {
            return Err(SelectionError::Closed);
        }

        let drone_id = self
            .selected
            .clone()
            .ok_or(SelectionError::NothingSelected)?;
        let emergency = self.emergency.clone().ok_or(SelectionError::NoIncident)?;

        let drone = latest
            .and_then(|drones| drones.iter().find(|d| d.id == drone_id))
            .cloned();

        let drone = match drone {
            Some(drone) if drone.is_ready() => drone,
            Some(_) => {
                warn!(drone_id = %drone_id, "Drone no longer ready at confirmation");
                self.selected = None;
                self.refresh(latest);
                return Err(SelectionError::NotReady(drone_id));
            }
            None => {
                warn!(drone_id = %drone_id, "Drone vanished before confirmation");
                self.selected = None;
                self.refresh(latest);
                return Err(SelectionError::UnknownDrone(drone_id));
            }
        };

        info!(
            drone_id = %drone.id,
            emergency_id = %emergency.id,
            "Deployment confirmed"
        );
        Ok(DeployCommand { drone, emergency })
    }

    /// Close the session and drop all transient state
    pub fn close(&mut self) {
        self.open = false;
        self.candidates.clear();
        self.query.clear();
        self.pending = None;
        self.selected = None;
    }
}
