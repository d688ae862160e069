use super::{ApiError, SharedApiState};
use crate::map::Camera;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ViewportResponse {
    pub camera: Camera,
    pub readout: String,
}

pub fn create_viewport_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/api/viewport", get(get_viewport))
        .route("/api/viewport/emergency/:id", post(center_on_emergency))
        .route("/api/viewport/drone/:id", post(center_on_drone))
        .route("/api/viewport/reset", post(reset_viewport))
        .with_state(state)
}

async fn respond(state: &SharedApiState, camera: Camera) -> Json<ViewportResponse> {
    Json(ViewportResponse {
        camera,
        readout: state.console.viewport_readout().await,
    })
}

/// GET /api/viewport
async fn get_viewport(State(state): State<SharedApiState>) -> Json<ViewportResponse> {
    let camera = state.console.camera().await;
    respond(&state, camera).await
}

/// POST /api/viewport/emergency/:id
async fn center_on_emergency(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<ViewportResponse>, ApiError> {
    let camera = state.console.center_on_emergency(&id).await?;
    Ok(respond(&state, camera).await)
}

/// POST /api/viewport/drone/:id
async fn center_on_drone(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<ViewportResponse>, ApiError> {
    let camera = state.console.center_on_drone(&id).await?;
    Ok(respond(&state, camera).await)
}

/// POST /api/viewport/reset
async fn reset_viewport(State(state): State<SharedApiState>) -> Json<ViewportResponse> {
    let camera = state.console.reset_view().await;
    respond(&state, camera).await
}
