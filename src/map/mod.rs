// Map rendering surface: the primitive operations the engine issues

mod recording;

pub use recording::{PrimitiveSet, RecordingSurface};

use crate::geo::{Geometry, LngLat};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Surface shared by the lifecycle manager, animation tasks and viewport
pub type SharedSurface = Arc<Mutex<dyn MapSurface + Send>>;

/// Accent colour for coverage circles and path lines
pub const ACCENT_BLUE: &str = "#00D2FF";

/// Owned handle to a marker placed on the surface.
///
/// Not `Clone`: removing a marker consumes its handle.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerClass {
    Station,
    Emergency,
    Drone,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Center,
    Bottom,
}

/// DOM-like element a marker is drawn with
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerElement {
    pub dom_id: String,
    pub class: MarkerClass,
    pub anchor: Anchor,
}

impl MarkerElement {
    pub fn station(id: &str) -> Self {
        Self {
            dom_id: format!("station-{}", id),
            class: MarkerClass::Station,
            anchor: Anchor::Bottom,
        }
    }

    pub fn emergency(id: &str) -> Self {
        Self {
            dom_id: format!("emergency-{}", id),
            class: MarkerClass::Emergency,
            anchor: Anchor::Center,
        }
    }

    pub fn drone(id: &str) -> Self {
        Self {
            dom_id: format!("drone-{}", id),
            class: MarkerClass::Drone,
            anchor: Anchor::Center,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinePaint {
    pub color: String,
    pub width: f64,
    pub opacity: Option<f64>,
    pub dash: Option<Vec<f64>>,
}

/// Line layer drawing a geojson source
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineLayer {
    pub id: String,
    pub source: String,
    pub paint: LinePaint,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
    pub bearing: f64,
}

pub fn circle_source_id(station_id: &str) -> String {
    format!("circle-{}", station_id)
}

pub fn circle_layer_id(station_id: &str) -> String {
    format!("circle-layer-{}", station_id)
}

pub fn line_source_id(drone_id: &str) -> String {
    format!("line-{}", drone_id)
}

pub fn line_layer_id(drone_id: &str) -> String {
    format!("line-layer-{}", drone_id)
}

/// Primitive operations of a map rendering surface.
///
/// Implementations never draw on behalf of the engine beyond what is asked;
/// the engine owns the identity-keyed set of primitives.
pub trait MapSurface {
    fn add_marker(&mut self, element: MarkerElement, at: LngLat) -> MarkerHandle;

    /// Returns false if the marker is no longer on the surface
    fn set_marker_position(&mut self, marker: &MarkerHandle, at: LngLat) -> bool;

    fn remove_marker(&mut self, marker: MarkerHandle);

    fn add_source(&mut self, id: &str, data: Geometry);

    fn has_source(&self, id: &str) -> bool;

    fn remove_source(&mut self, id: &str);

    fn add_layer(&mut self, layer: LineLayer);

    fn has_layer(&self, id: &str) -> bool;

    fn remove_layer(&mut self, id: &str);

    fn set_dash_pattern(&mut self, layer_id: &str, pattern: &[f64]);

    fn fly_to(&mut self, camera: Camera);

    fn camera(&self) -> Camera;
}
