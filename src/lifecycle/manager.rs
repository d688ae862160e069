use crate::animation::{PathAnimator, DASH_SEQUENCE};
use crate::config::CoverageConfig;
use crate::entity::{DeployedDroneUpdate, Emergency, Station, TrackedUnit};
use crate::geo::{circle, line, LngLat, Location};
use crate::map::{
    circle_layer_id, circle_source_id, line_layer_id, line_source_id, LineLayer, LinePaint,
    MapSurface, MarkerElement, MarkerHandle, SharedSurface, ACCENT_BLUE,
};
use crate::state::SnapshotStore;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

type Surface = dyn MapSurface + Send;

/// Station marker plus its coverage circle
#[derive(Debug)]
pub struct StationVisual {
    marker: MarkerHandle,
    circle_source: String,
    circle_layer: String,
}

impl StationVisual {
    pub fn marker(&self) -> &MarkerHandle {
        &self.marker
    }

    pub fn circle_layer(&self) -> &str {
        &self.circle_layer
    }

    pub fn circle_source(&self) -> &str {
        &self.circle_source
    }
}

/// Animated line from where the unit was when the path was drawn to its target
#[derive(Debug)]
struct PathVisual {
    source: String,
    layer: String,
    target: Location,
}

/// Everything rendered for one drone. A missing entry means "not rendered".
#[derive(Debug)]
pub struct DroneVisual {
    marker: MarkerHandle,
    path: Option<PathVisual>,
}

/// What one drone reconciliation pass changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DroneReport {
    pub added: usize,
    pub moved: usize,
    pub removed: usize,
    pub paths_added: usize,
    pub paths_removed: usize,
}

/// Keeps the map surface's markers, sources and layers consistent with the
/// snapshot store.
///
/// Stations are append-only, emergencies are cleared and rebuilt on every
/// change, and drones are diffed per id so their animations survive updates.
pub struct LayerManager {
    surface: SharedSurface,
    animator: PathAnimator,
    coverage: CoverageConfig,
    stations: HashMap<String, StationVisual>,
    emergencies: Vec<MarkerHandle>,
    drones: HashMap<String, DroneVisual>,
    /// Marker moves waiting for the next paint frame, last write wins
    pending_moves: HashMap<String, LngLat>,
}

impl LayerManager {
    pub fn new(surface: SharedSurface, coverage: CoverageConfig, tick_interval: Duration) -> Self {
        let animator = PathAnimator::new(surface.clone(), tick_interval);
        Self {
            surface,
            animator,
            coverage,
            stations: HashMap::new(),
            emergencies: Vec::new(),
            drones: HashMap::new(),
            pending_moves: HashMap::new(),
        }
    }

    /// Add a marker and coverage circle for every station not yet on the map
    pub async fn render_stations(&mut self, stations: &[Station]) -> usize {
        let mut map = self.surface.lock().await;
        let mut added = 0;

        for station in stations {
            if self.stations.contains_key(&station.id) {
                continue;
            }

            let circle_source = circle_source_id(&station.id);
            let circle_layer = circle_layer_id(&station.id);

            if !map.has_source(&circle_source) {
                map.add_source(
                    &circle_source,
                    circle(station.location, self.coverage.radius_miles, self.coverage.steps),
                );
            }
            if !map.has_layer(&circle_layer) {
                map.add_layer(LineLayer {
                    id: circle_layer.clone(),
                    source: circle_source.clone(),
                    paint: LinePaint {
                        color: ACCENT_BLUE.to_string(),
                        width: 1.0,
                        opacity: Some(0.33),
                        dash: None,
                    },
                });
            }

            let marker = map.add_marker(MarkerElement::station(&station.id), station.location.into());
            self.stations.insert(
                station.id.clone(),
                StationVisual {
                    marker,
                    circle_source,
                    circle_layer,
                },
            );
            added += 1;
        }

        if added > 0 {
            info!(added, total = self.stations.len(), "Stations rendered");
        }
        added
    }

    /// Drop every emergency marker and create one per entry in the new list
    pub async fn render_emergencies(&mut self, emergencies: &[Emergency]) -> usize {
        let mut map = self.surface.lock().await;

        for marker in self.emergencies.drain(..) {
            map.remove_marker(marker);
        }

        for emergency in emergencies {
            let Some(location) = emergency.location else {
                debug!(emergency_id = %emergency.id, "Emergency without location, not rendered");
                continue;
            };
            let marker = map.add_marker(MarkerElement::emergency(&emergency.id), location.into());
            self.emergencies.push(marker);
        }

        debug!(count = self.emergencies.len(), "Emergencies rebuilt");
        self.emergencies.len()
    }

    /// Diff the live drone list against what is rendered, by id.
    ///
    /// Ids missing from `updates` are torn down like undeployed units.
    pub async fn reconcile_drones(
        &mut self,
        updates: &[DeployedDroneUpdate],
        stations: Option<&[Station]>,
    ) -> DroneReport {
        let mut map = self.surface.lock().await;
        let mut report = DroneReport::default();
        let mut present = HashSet::with_capacity(updates.len());

        for update in updates {
            let unit = update.tracked();
            present.insert(unit.id.clone());

            if !unit.deployed {
                if teardown_drone(&mut *map, &self.animator, &unit.id, self.drones.remove(&unit.id)) {
                    report.removed += 1;
                }
                self.pending_moves.remove(&unit.id);
                continue;
            }

            if let Some(visual) = self.drones.get_mut(&unit.id) {
                if let Some(location) = unit.location {
                    self.pending_moves.insert(unit.id.clone(), location.into());
                    report.moved += 1;
                }

                let wanted = if unit.wants_path(stations) {
                    unit.heading_location
                } else {
                    None
                };
                let current = visual.path.as_ref().map(|p| p.target);

                if current.is_some() && current != wanted {
                    if let Some(path) = visual.path.take() {
                        remove_path(&mut *map, &self.animator, &unit.id, path);
                        report.paths_removed += 1;
                    }
                }
                if visual.path.is_none() {
                    if let (Some(target), Some(from)) = (wanted, unit.location) {
                        visual.path = Some(add_path(&mut *map, &self.animator, &unit.id, from, target));
                        report.paths_added += 1;
                    }
                }
            } else if let Some(location) = unit.location {
                let marker = map.add_marker(MarkerElement::drone(&unit.id), location.into());
                let path = path_target(&unit, stations).map(|target| {
                    report.paths_added += 1;
                    add_path(&mut *map, &self.animator, &unit.id, location, target)
                });
                self.drones
                    .insert(unit.id.clone(), DroneVisual { marker, path });
                report.added += 1;
            }
        }

        let orphans: Vec<String> = self
            .drones
            .keys()
            .filter(|id| !present.contains(*id))
            .cloned()
            .collect();
        for id in orphans {
            if teardown_drone(&mut *map, &self.animator, &id, self.drones.remove(&id)) {
                report.removed += 1;
            }
            self.pending_moves.remove(&id);
        }

        debug!(
            added = report.added,
            moved = report.moved,
            removed = report.removed,
            paths_added = report.paths_added,
            paths_removed = report.paths_removed,
            "Drone reconciliation pass"
        );
        report
    }

    /// Apply queued marker moves; called once per paint frame
    pub async fn flush_frame(&mut self) -> usize {
        if self.pending_moves.is_empty() {
            return 0;
        }

        let mut map = self.surface.lock().await;
        let mut applied = 0;
        for (id, position) in self.pending_moves.drain() {
            if let Some(visual) = self.drones.get(&id) {
                if map.set_marker_position(&visual.marker, position) {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Bring every visual in line with the store's current contents
    pub async fn sync_all(&mut self, store: &SnapshotStore) {
        let stations = store.stations();
        if let Some(stations) = stations.as_deref() {
            self.render_stations(stations).await;
        }
        if let Some(emergencies) = store.emergencies() {
            self.render_emergencies(&emergencies).await;
        }
        let deployed = store.deployed();
        self.reconcile_drones(&deployed, stations.as_deref().map(|s| s.as_slice()))
            .await;
    }

    pub fn has_drone(&self, drone_id: &str) -> bool {
        self.drones.contains_key(drone_id)
    }

    pub fn has_path(&self, drone_id: &str) -> bool {
        self.drones
            .get(drone_id)
            .map(|v| v.path.is_some())
            .unwrap_or(false)
    }

    pub fn rendered_drones(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.drones.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn station(&self, station_id: &str) -> Option<&StationVisual> {
        self.stations.get(station_id)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn emergency_count(&self) -> usize {
        self.emergencies.len()
    }

    pub fn pending_moves(&self) -> usize {
        self.pending_moves.len()
    }

    pub fn animator(&self) -> &PathAnimator {
        &self.animator
    }
}

fn path_target(unit: &TrackedUnit, stations: Option<&[Station]>) -> Option<Location> {
    if unit.wants_path(stations) {
        unit.heading_location
    } else {
        None
    }
}

fn add_path(
    map: &mut Surface,
    animator: &PathAnimator,
    drone_id: &str,
    from: Location,
    target: Location,
) -> PathVisual {
    let source = line_source_id(drone_id);
    let layer = line_layer_id(drone_id);

    if map.has_layer(&layer) {
        map.remove_layer(&layer);
    }
    if map.has_source(&source) {
        map.remove_source(&source);
    }

    map.add_source(&source, line(from, target));
    map.add_layer(LineLayer {
        id: layer.clone(),
        source: source.clone(),
        paint: LinePaint {
            color: ACCENT_BLUE.to_string(),
            width: 1.0,
            opacity: None,
            dash: Some(DASH_SEQUENCE[0].to_vec()),
        },
    });
    animator.start(drone_id, layer.clone());

    debug!(drone_id = %drone_id, "Path layer added");
    PathVisual {
        source,
        layer,
        target,
    }
}

fn remove_path(map: &mut Surface, animator: &PathAnimator, drone_id: &str, path: PathVisual) {
    animator.stop(drone_id);
    if map.has_layer(&path.layer) {
        map.remove_layer(&path.layer);
    }
    if map.has_source(&path.source) {
        map.remove_source(&path.source);
    }
    debug!(drone_id = %drone_id, "Path layer removed");
}

/// Remove marker, path and animation for a unit. Returns true if a marker was removed.
fn teardown_drone(
    map: &mut Surface,
    animator: &PathAnimator,
    drone_id: &str,
    visual: Option<DroneVisual>,
) -> bool {
    animator.stop(drone_id);

    // Checked by id as well, in case a layer outlived its bookkeeping
    let layer = line_layer_id(drone_id);
    let source = line_source_id(drone_id);
    if map.has_layer(&layer) {
        map.remove_layer(&layer);
    }
    if map.has_source(&source) {
        map.remove_source(&source);
    }

    match visual {
        Some(visual) => {
            map.remove_marker(visual.marker);
            debug!(drone_id = %drone_id, "Drone marker removed");
            true
        }
        None => false,
    }
}
