// Geodesy helpers and coordinate types
pub mod geo;

// Entity model pushed over the live channel
pub mod entity;

// Snapshot store and fleet summaries
pub mod state;

// Map rendering surface abstraction
pub mod map;

// Path dash animation
pub mod animation;

// Marker and layer reconciliation
pub mod lifecycle;

// Deployment candidate selection
pub mod selection;

// Camera control
pub mod viewport;

// Live channel codec and feed
pub mod channel;

// Operator actions
pub mod console;

// HTTP API
pub mod api;

// Configuration
pub mod config;
