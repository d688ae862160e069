use super::{ApiError, SharedApiState};
use crate::console::SessionView;
use crate::selection::DeployCommand;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub emergency_id: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickRequest {
    pub drone_id: String,
}

pub fn create_selection_router(state: SharedApiState) -> Router {
    Router::new()
        .route(
            "/api/selection",
            post(open_selection).get(get_selection).delete(cancel_selection),
        )
        .route("/api/selection/query", post(set_query))
        .route("/api/selection/pick", post(pick_drone))
        .route("/api/selection/confirm", post(confirm_selection))
        .with_state(state)
}

/// POST /api/selection - open a session for an incident
async fn open_selection(
    State(state): State<SharedApiState>,
    Json(request): Json<OpenRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.console.open_deployment(&request.emergency_id).await?;
    Ok(Json(view))
}

/// GET /api/selection - session with its visible candidates
async fn get_selection(State(state): State<SharedApiState>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.console.candidates().await?))
}

/// POST /api/selection/query - update the search box.
///
/// Responds once the debounce window has passed and the filter is applied.
async fn set_query(
    State(state): State<SharedApiState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state.console.search(&request.query).await?;
    Ok(Json(state.console.settle_search().await?))
}

/// POST /api/selection/pick
async fn pick_drone(
    State(state): State<SharedApiState>,
    Json(request): Json<PickRequest>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.console.pick(&request.drone_id).await?))
}

/// POST /api/selection/confirm - emit deployDrone and close the session
async fn confirm_selection(
    State(state): State<SharedApiState>,
) -> Result<Json<DeployCommand>, ApiError> {
    Ok(Json(state.console.confirm().await?))
}

/// DELETE /api/selection
async fn cancel_selection(State(state): State<SharedApiState>) -> Response {
    if state.console.cancel().await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        ApiError(crate::console::ConsoleError::NoSession).into_response()
    }
}
