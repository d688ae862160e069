use super::SharedApiState;
use crate::entity::Emergency;
use crate::state::{DeployedRow, FleetCounts};
use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

/// Status panel contents
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetResponse {
    pub counts: FleetCounts,
    pub deployed: Vec<DeployedRow>,
    pub readout: String,
}

pub fn create_fleet_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/api/fleet", get(get_fleet))
        .route("/api/emergencies", get(list_emergencies))
        .with_state(state)
}

/// GET /api/fleet - counters, deployed rows and the viewport readout
async fn get_fleet(State(state): State<SharedApiState>) -> Json<FleetResponse> {
    Json(FleetResponse {
        counts: state.console.fleet_counts(),
        deployed: state.console.deployed_rows(),
        readout: state.console.viewport_readout().await,
    })
}

/// GET /api/emergencies - latest incident list, empty before the first push
async fn list_emergencies(State(state): State<SharedApiState>) -> Json<Vec<Emergency>> {
    Json(state.console.emergencies())
}
