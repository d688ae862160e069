use super::{Camera, LineLayer, MapSurface, MarkerElement, MarkerHandle};
use crate::geo::{Geometry, LngLat};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Clone, Debug)]
struct RecordedMarker {
    element: MarkerElement,
    position: LngLat,
}

#[derive(Clone, Debug)]
struct RecordedLayer {
    layer: LineLayer,
    dash_updates: usize,
}

/// Identity view of everything currently on a surface
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PrimitiveSet {
    pub markers: BTreeSet<String>,
    pub sources: BTreeSet<String>,
    pub layers: BTreeSet<String>,
}

/// In-memory map surface.
///
/// Keeps every primitive it is asked to create so the headless binary and
/// the tests can inspect what a real renderer would show.
#[derive(Debug)]
pub struct RecordingSurface {
    next_marker: u64,
    markers: HashMap<u64, RecordedMarker>,
    sources: HashMap<String, Geometry>,
    layers: HashMap<String, RecordedLayer>,
    camera: Camera,
    flights: Vec<Camera>,
}

impl RecordingSurface {
    pub fn new(camera: Camera) -> Self {
        Self {
            next_marker: 1,
            markers: HashMap::new(),
            sources: HashMap::new(),
            layers: HashMap::new(),
            camera,
            flights: Vec::new(),
        }
    }

    pub fn primitives(&self) -> PrimitiveSet {
        PrimitiveSet {
            markers: self.markers.values().map(|m| m.element.dom_id.clone()).collect(),
            sources: self.sources.keys().cloned().collect(),
            layers: self.layers.keys().cloned().collect(),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_marker(&self, dom_id: &str) -> bool {
        self.markers.values().any(|m| m.element.dom_id == dom_id)
    }

    pub fn marker_position(&self, dom_id: &str) -> Option<LngLat> {
        self.markers
            .values()
            .find(|m| m.element.dom_id == dom_id)
            .map(|m| m.position)
    }

    pub fn marker_element(&self, dom_id: &str) -> Option<&MarkerElement> {
        self.markers
            .values()
            .map(|m| &m.element)
            .find(|e| e.dom_id == dom_id)
    }

    pub fn source(&self, id: &str) -> Option<&Geometry> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LineLayer> {
        self.layers.get(id).map(|l| &l.layer)
    }

    pub fn dash_pattern(&self, layer_id: &str) -> Option<&[f64]> {
        self.layers.get(layer_id)?.layer.paint.dash.as_deref()
    }

    /// Number of dash updates applied to a layer since it was added
    pub fn dash_updates(&self, layer_id: &str) -> usize {
        self.layers.get(layer_id).map(|l| l.dash_updates).unwrap_or(0)
    }

    pub fn flights(&self) -> &[Camera] {
        &self.flights
    }

    /// Simulate the user panning or zooming the map directly
    pub fn pan(&mut self, camera: Camera) {
        self.camera = camera;
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, element: MarkerElement, at: LngLat) -> MarkerHandle {
        let raw = self.next_marker;
        self.next_marker += 1;
        debug!(dom_id = %element.dom_id, "Marker added");
        self.markers.insert(
            raw,
            RecordedMarker {
                element,
                position: at,
            },
        );
        MarkerHandle::new(raw)
    }

    fn set_marker_position(&mut self, marker: &MarkerHandle, at: LngLat) -> bool {
        match self.markers.get_mut(&marker.raw()) {
            Some(recorded) => {
                recorded.position = at;
                true
            }
            None => false,
        }
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        if let Some(removed) = self.markers.remove(&marker.raw()) {
            debug!(dom_id = %removed.element.dom_id, "Marker removed");
        }
    }

    fn add_source(&mut self, id: &str, data: Geometry) {
        self.sources.insert(id.to_string(), data);
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn remove_source(&mut self, id: &str) {
        self.sources.remove(id);
    }

    fn add_layer(&mut self, layer: LineLayer) {
        self.layers.insert(
            layer.id.clone(),
            RecordedLayer {
                layer,
                dash_updates: 0,
            },
        );
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn remove_layer(&mut self, id: &str) {
        self.layers.remove(id);
    }

    fn set_dash_pattern(&mut self, layer_id: &str, pattern: &[f64]) {
        if let Some(recorded) = self.layers.get_mut(layer_id) {
            recorded.layer.paint.dash = Some(pattern.to_vec());
            recorded.dash_updates += 1;
        }
    }

    fn fly_to(&mut self, camera: Camera) {
        self.camera = camera;
        self.flights.push(camera);
    }

    fn camera(&self) -> Camera {
        self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{line, Location};
    use crate::map::{LinePaint, ACCENT_BLUE};

    fn surface() -> RecordingSurface {
        RecordingSurface::new(Camera {
            center: LngLat(-122.1164, 47.664),
            zoom: 12.5,
            bearing: 0.0,
        })
    }

    #[test]
    fn marker_handles_are_unique_and_removable() {
        let mut s = surface();
        let a = s.add_marker(MarkerElement::drone("r1"), LngLat(-122.1, 47.6));
        let b = s.add_marker(MarkerElement::drone("r2"), LngLat(-122.2, 47.7));
        assert_ne!(a, b);

        assert!(s.set_marker_position(&a, LngLat(-122.0, 47.5)));
        assert_eq!(s.marker_position("drone-r1"), Some(LngLat(-122.0, 47.5)));

        s.remove_marker(a);
        assert!(!s.has_marker("drone-r1"));
        assert!(s.has_marker("drone-r2"));
    }

    #[test]
    fn dash_updates_only_apply_to_existing_layers() {
        let mut s = surface();
        s.add_source(
            "line-r1",
            line(Location::new(47.6, -122.1), Location::new(47.7, -122.2)),
        );
        s.add_layer(LineLayer {
            id: "line-layer-r1".to_string(),
            source: "line-r1".to_string(),
            paint: LinePaint {
                color: ACCENT_BLUE.to_string(),
                width: 1.0,
                opacity: None,
                dash: Some(vec![0.0, 1.0, 5.0, 9.0]),
            },
        });

        s.set_dash_pattern("line-layer-r1", &[0.0, 2.0, 5.0, 8.0]);
        s.set_dash_pattern("line-layer-missing", &[0.0, 2.0, 5.0, 8.0]);

        assert_eq!(s.dash_pattern("line-layer-r1"), Some(&[0.0, 2.0, 5.0, 8.0][..]));
        assert_eq!(s.dash_updates("line-layer-r1"), 1);
        assert!(!s.has_layer("line-layer-missing"));
    }

    #[test]
    fn fly_to_records_flights() {
        let mut s = surface();
        let target = Camera {
            center: LngLat(-122.14, 47.66),
            zoom: 14.5,
            bearing: 0.0,
        };

        s.fly_to(target);

        assert_eq!(s.camera(), target);
        assert_eq!(s.flights(), &[target]);
    }
}
