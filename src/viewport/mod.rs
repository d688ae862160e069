// Camera control and the coordinate readout

use crate::config::ViewportConfig;
use crate::entity::ZoomTarget;
use crate::geo::LngLat;
use crate::map::{Camera, SharedSurface};
use tracing::debug;

pub struct ViewportController {
    surface: SharedSurface,
    config: ViewportConfig,
    center: LngLat,
    zoom: f64,
    bearing: f64,
}

impl ViewportController {
    pub fn new(surface: SharedSurface, config: ViewportConfig) -> Self {
        let [lng, lat] = config.initial_center;
        let zoom = config.initial_zoom;
        let bearing = config.initial_bearing;
        Self {
            surface,
            config,
            center: LngLat(lng, lat),
            zoom,
            bearing,
        }
    }

    /// Camera the map starts at
    pub fn initial_camera(config: &ViewportConfig) -> Camera {
        let [lng, lat] = config.initial_center;
        Camera {
            center: LngLat(lng, lat),
            zoom: config.initial_zoom,
            bearing: config.initial_bearing,
        }
    }

    /// Fly to `target`, bearing north, within zoom limits and `max_bounds`
    pub async fn fly_to(&mut self, target: ZoomTarget) -> Camera {
        self.fly(target, 0.0).await
    }

    /// Fly back to the configured initial camera, bearing included
    pub async fn reset(&mut self) -> Camera {
        let [lng, lat] = self.config.initial_center;
        let target = ZoomTarget::new(LngLat(lng, lat), self.config.initial_zoom);
        self.fly(target, self.config.initial_bearing).await
    }

    async fn fly(&mut self, target: ZoomTarget, bearing: f64) -> Camera {
        let camera = Camera {
            center: self.clamp_center(target.location),
            zoom: self.clamp_zoom(target.zoom),
            bearing,
        };

        self.surface.lock().await.fly_to(camera);
        debug!(
            lng = camera.center.lng(),
            lat = camera.center.lat(),
            zoom = camera.zoom,
            bearing = camera.bearing,
            "Camera flight"
        );

        self.on_move(camera.center, camera.zoom);
        self.bearing = camera.bearing;
        camera
    }

    /// Record the camera after any movement, including a direct pan
    pub fn on_move(&mut self, center: LngLat, zoom: f64) {
        self.center = self.clamp_center(center);
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Pick up movements made on the surface itself
    pub async fn sync_from_surface(&mut self) -> Camera {
        let camera = self.surface.lock().await.camera();
        self.on_move(camera.center, camera.zoom);
        self.bearing = camera.bearing;
        self.camera()
    }

    pub fn readout(&self) -> String {
        format!(
            "Longitude: {:.4} | Latitude: {:.4} | Zoom: {:.2}",
            self.center.lng(),
            self.center.lat(),
            self.zoom
        )
    }

    pub fn camera(&self) -> Camera {
        Camera {
            center: self.center,
            zoom: self.zoom,
            bearing: self.bearing,
        }
    }

    pub fn emergency_zoom(&self) -> f64 {
        self.config.emergency_zoom
    }

    pub fn drone_zoom(&self) -> f64 {
        self.config.drone_zoom
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    fn clamp_center(&self, center: LngLat) -> LngLat {
        let [west, south, east, north] = self.config.max_bounds;
        LngLat(center.lng().clamp(west, east), center.lat().clamp(south, north))
    }
}
