// Operator console: the actions behind the dashboard's panels and buttons

use crate::channel::CommandSender;
use crate::entity::{Emergency, ZoomTarget};
use crate::map::Camera;
use crate::selection::{Candidate, DeployCommand, DeploymentSelector, SelectionError};
use crate::state::{deployed_rows, DeployedRow, FleetCounts, SnapshotStore};
use crate::viewport::ViewportController;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info};


#[derive(Debug)]
pub enum ConsoleError {
    NoSession,
    UnknownEmergency(String),
    UnknownDrone(String),
    /// Entity exists but has no position to centre on
    NoLocation(String),
    Selection(SelectionError),
    Channel(String),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::NoSession => write!(f, "no deployment selection is open"),
            ConsoleError::UnknownEmergency(id) => write!(f, "unknown emergency '{}'", id),
            ConsoleError::UnknownDrone(id) => write!(f, "unknown drone '{}'", id),
            ConsoleError::NoLocation(id) => write!(f, "'{}' has no known location", id),
            ConsoleError::Selection(e) => write!(f, "{}", e),
            ConsoleError::Channel(reason) => write!(f, "command not sent: {}", reason),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<SelectionError> for ConsoleError {
    fn from(e: SelectionError) -> Self {
        ConsoleError::Selection(e)
    }
}

/// Snapshot of the open selection session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub emergency_id: Option<String>,
    pub query: String,
    pub selected: Option<String>,
    pub can_confirm: bool,
    pub candidates: Vec<Candidate>,
}

impl SessionView {
    fn of(selector: &DeploymentSelector) -> Self {
        Self {
            emergency_id: selector.emergency().map(|e| e.id.clone()),
            query: selector.query().to_string(),
            selected: selector.selected().map(str::to_string),
            can_confirm: selector.can_confirm(),
            candidates: selector.candidates().into_iter().cloned().collect(),
        }
    }
}

pub struct OperatorConsole {
    store: Arc<SnapshotStore>,
    commands: CommandSender,
    session: Mutex<Option<DeploymentSelector>>,
    viewport: Mutex<ViewportController>,
    debounce: Duration,
}

impl OperatorConsole {
    pub fn new(
        store: Arc<SnapshotStore>,
        commands: CommandSender,
        viewport: ViewportController,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            commands,
            session: Mutex::new(None),
            viewport: Mutex::new(viewport),
            debounce,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Open a selection session for an incident, replacing any open one
    pub async fn open_deployment(&self, emergency_id: &str) -> Result<SessionView, ConsoleError> {
        let emergency = self
            .store
            .emergency(emergency_id)
            .ok_or_else(|| ConsoleError::UnknownEmergency(emergency_id.to_string()))?;

        let drones = self.store.drones();
        let selector = DeploymentSelector::open(
            Some(emergency),
            drones.as_deref().map(Vec::as_slice),
            self.debounce,
        );
        let view = SessionView::of(&selector);

        let mut session = self.session.lock().await;
        if session.is_some() {
            info!(emergency_id = %emergency_id, "Replacing open deployment selection");
        }
        *session = Some(selector);

        Ok(view)
    }

    /// Type into the search box; takes effect after the debounce window
    pub async fn search(&self, query: &str) -> Result<(), ConsoleError> {
        let mut session = self.session.lock().await;
        let selector = session.as_mut().ok_or(ConsoleError::NoSession)?;
        selector.type_query(query);
        Ok(())
    }

    /// Wait for a pending search to apply, then return the session
    pub async fn settle_search(&self) -> Result<SessionView, ConsoleError> {
        let due = {
            let session = self.session.lock().await;
            session
                .as_ref()
                .ok_or(ConsoleError::NoSession)?
                .pending_due()
        };

        if let Some(due) = due {
            sleep_until(due).await;
        }
        self.candidates().await
    }

    /// Current session against the latest drone snapshot
    pub async fn candidates(&self) -> Result<SessionView, ConsoleError> {
        let drones = self.store.drones();
        let mut session = self.session.lock().await;
        let selector = session.as_mut().ok_or(ConsoleError::NoSession)?;

        selector.refresh(drones.as_deref().map(Vec::as_slice));
        selector.apply_due(Instant::now());
        Ok(SessionView::of(selector))
    }

    pub async fn pick(&self, drone_id: &str) -> Result<SessionView, ConsoleError> {
        let drones = self.store.drones();
        let mut session = self.session.lock().await;
        let selector = session.as_mut().ok_or(ConsoleError::NoSession)?;

        selector.refresh(drones.as_deref().map(Vec::as_slice));
        selector.select(drone_id)?;
        Ok(SessionView::of(selector))
    }

    /// Confirm the picked unit and emit `deployDrone`.
    ///
    /// The session closes only once the command is queued, so a repeated
    /// confirm finds nothing open and the command goes out once. If the
    /// queue is closed the session and pick stay as they were.
    pub async fn confirm(&self) -> Result<DeployCommand, ConsoleError> {
        let drones = self.store.drones();
        let mut session = self.session.lock().await;
        let selector = session.as_mut().ok_or(ConsoleError::NoSession)?;
        let command = selector.command(drones.as_deref().map(Vec::as_slice))?;

        if let Err(e) = self.commands.deploy(command.clone()).await {
            error!(error = %e, drone_id = %command.drone_id(), "Failed to emit deployDrone");
            return Err(ConsoleError::Channel(e.to_string()));
        }

        selector.close();
        *session = None;
        Ok(command)
    }

    /// Close the session without deploying; returns whether one was open
    pub async fn cancel(&self) -> bool {
        match self.session.lock().await.take() {
            Some(mut selector) => {
                selector.close();
                true
            }
            None => false,
        }
    }

    pub async fn session(&self) -> Option<SessionView> {
        self.candidates().await.ok()
    }

    pub async fn center_on_emergency(&self, emergency_id: &str) -> Result<Camera, ConsoleError> {
        let emergency = self
            .store
            .emergency(emergency_id)
            .ok_or_else(|| ConsoleError::UnknownEmergency(emergency_id.to_string()))?;

        let mut viewport = self.viewport.lock().await;
        let target = ZoomTarget::for_emergency(&emergency, viewport.emergency_zoom())
            .ok_or_else(|| ConsoleError::NoLocation(emergency_id.to_string()))?;
        Ok(viewport.fly_to(target).await)
    }

    /// Centre on a unit, preferring its live position when deployed
    pub async fn center_on_drone(&self, drone_id: &str) -> Result<Camera, ConsoleError> {
        let live = self
            .store
            .deployed()
            .iter()
            .find(|u| u.id() == drone_id)
            .and_then(|u| u.tracked().location);

        let location = match live {
            Some(location) => location,
            None => {
                let drone = self
                    .store
                    .drone(drone_id)
                    .ok_or_else(|| ConsoleError::UnknownDrone(drone_id.to_string()))?;
                drone
                    .status
                    .current_location
                    .ok_or_else(|| ConsoleError::NoLocation(drone_id.to_string()))?
            }
        };

        let mut viewport = self.viewport.lock().await;
        let target = ZoomTarget::new(location.into(), viewport.drone_zoom());
        Ok(viewport.fly_to(target).await)
    }

    pub async fn reset_view(&self) -> Camera {
        self.viewport.lock().await.reset().await
    }

    pub async fn camera(&self) -> Camera {
        self.viewport.lock().await.sync_from_surface().await
    }

    pub async fn viewport_readout(&self) -> String {
        let mut viewport = self.viewport.lock().await;
        viewport.sync_from_surface().await;
        viewport.readout()
    }

    pub fn fleet_counts(&self) -> FleetCounts {
        self.store
            .drones()
            .map(|drones| FleetCounts::from_drones(&drones))
            .unwrap_or_default()
    }

    pub fn deployed_rows(&self) -> Vec<DeployedRow> {
        deployed_rows(&self.store.deployed())
    }

    pub fn emergencies(&self) -> Vec<Emergency> {
        self.store
            .emergencies()
            .map(|list| list.as_ref().clone())
            .unwrap_or_default()
    }
}
