// Geospatial primitives: great-circle distance, coverage circles, path lines

use serde::{Deserialize, Serialize};


/// Mean earth radius expressed in statute miles
pub const EARTH_RADIUS_MILES: f64 = 6_371_008.8 / 1_609.344;

/// Geographic point in degrees, `{lat, lng}` order as used inside the engine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// `[lng, lat]` pair used at the map surface and channel boundary.
///
/// Serializes as a two-element JSON array. Conversions to and from
/// [`Location`] are the only place the axis order flips.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LngLat(pub f64, pub f64);

impl LngLat {
    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

impl From<Location> for LngLat {
    fn from(loc: Location) -> Self {
        LngLat(loc.lng, loc.lat)
    }
}

impl From<LngLat> for Location {
    fn from(pair: LngLat) -> Self {
        Location {
            lat: pair.1,
            lng: pair.0,
        }
    }
}

/// GeoJSON geometry backing a map source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    LineString(Vec<LngLat>),
    Polygon(Vec<Vec<LngLat>>),
}

impl Geometry {
    /// Vertices of the line, or of the outer ring for polygons
    pub fn vertices(&self) -> &[LngLat] {
        match self {
            Geometry::LineString(points) => points,
            Geometry::Polygon(rings) => rings.first().map(|r| r.as_slice()).unwrap_or(&[]),
        }
    }
}

/// Haversine distance in miles between two points
pub fn distance_miles(from: Location, to: Location) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Operator-facing distance: miles rounded to two decimals, zero when either end is unknown
pub fn display_distance(from: Option<Location>, to: Option<Location>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => round_hundredths(distance_miles(from, to)),
        _ => 0.0,
    }
}

pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Point reached by travelling `distance` miles from `origin` along `bearing_deg`
pub fn destination(origin: Location, distance: f64, bearing_deg: f64) -> Location {
    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();
    let bearing = bearing_deg.to_radians();
    let delta = distance / EARTH_RADIUS_MILES;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    Location {
        lat: lat2.to_degrees(),
        lng: lng2.to_degrees(),
    }
}

/// Closed polygon approximating a circle of `radius` miles with `steps` sides.
///
/// The ring has `steps + 1` vertices; the last repeats the first.
pub fn circle(center: Location, radius: f64, steps: usize) -> Geometry {
    let steps = steps.max(3);
    let mut ring: Vec<LngLat> = (0..steps)
        .map(|i| {
            let bearing = i as f64 * -360.0 / steps as f64;
            LngLat::from(destination(center, radius, bearing))
        })
        .collect();
    ring.push(ring[0]);
    Geometry::Polygon(vec![ring])
}

/// Straight two-point line between `from` and `to`
pub fn line(from: Location, to: Location) -> Geometry {
    Geometry::LineString(vec![LngLat::from(from), LngLat::from(to)])
}
