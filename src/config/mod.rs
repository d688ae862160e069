use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Path animation and paint-frame timing
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    /// Delay between dash pattern steps (milliseconds)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Paint frame period used to flush batched marker moves (milliseconds)
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    200
}

fn default_frame_interval() -> u64 {
    16
}

impl AnimationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

/// Candidate search behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    300
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}

/// Station coverage circle geometry
#[derive(Debug, Clone, Deserialize)]
pub struct CoverageConfig {
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,
    #[serde(default = "default_steps")]
    pub steps: usize,
}

fn default_radius_miles() -> f64 {
    1.5
}

fn default_steps() -> usize {
    40
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            radius_miles: default_radius_miles(),
            steps: default_steps(),
        }
    }
}

/// Camera limits and preset zoom levels
#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    /// `[lng, lat]`
    #[serde(default = "default_initial_center")]
    pub initial_center: [f64; 2],
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
    #[serde(default)]
    pub initial_bearing: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    /// `[west, south, east, north]`
    #[serde(default = "default_max_bounds")]
    pub max_bounds: [f64; 4],
    #[serde(default = "default_emergency_zoom")]
    pub emergency_zoom: f64,
    #[serde(default = "default_drone_zoom")]
    pub drone_zoom: f64,
}

fn default_initial_center() -> [f64; 2] {
    [-122.1164, 47.664]
}

fn default_initial_zoom() -> f64 {
    12.5
}

fn default_min_zoom() -> f64 {
    6.0
}

fn default_max_zoom() -> f64 {
    20.0
}

fn default_max_bounds() -> [f64; 4] {
    [-122.25, 47.5, -122.0, 47.75]
}

fn default_emergency_zoom() -> f64 {
    14.5
}

fn default_drone_zoom() -> f64 {
    16.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial_center: default_initial_center(),
            initial_zoom: default_initial_zoom(),
            initial_bearing: 0.0,
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            max_bounds: default_max_bounds(),
            emergency_zoom: default_emergency_zoom(),
            drone_zoom: default_drone_zoom(),
        }
    }
}

/// Operator API listener
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<DashboardConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
    let config: DashboardConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path))?;
    Ok(config)
}

/// Load from `FLEETVIEW_CONFIG` when set, defaults otherwise
pub fn from_env() -> Result<DashboardConfig> {
    match std::env::var("FLEETVIEW_CONFIG") {
        Ok(path) if !path.trim().is_empty() => load_config(&path),
        _ => Ok(DashboardConfig::default()),
    }
}
