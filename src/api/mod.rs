// Operator HTTP API

mod error;
pub mod fleet;
pub mod selection;
pub mod viewport;

pub use error::ApiError;
pub use fleet::create_fleet_router;
pub use selection::create_selection_router;
pub use viewport::create_viewport_router;

use crate::console::OperatorConsole;
use axum::Router;
use std::sync::Arc;

/// Shared state for every API router
pub struct ApiState {
    pub console: Arc<OperatorConsole>,
}

pub type SharedApiState = Arc<ApiState>;

/// All operator routes on one router
pub fn create_router(state: SharedApiState) -> Router {
    Router::new()
        .merge(create_fleet_router(state.clone()))
        .merge(create_selection_router(state.clone()))
        .merge(create_viewport_router(state))
}
