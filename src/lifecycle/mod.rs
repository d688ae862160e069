// Marker/layer lifecycle: reconciles store snapshots onto the map surface

mod manager;
mod reconciler;

pub use manager::{DroneReport, DroneVisual, LayerManager, StationVisual};
pub use reconciler::run_reconciler;
