use crate::console::ConsoleError;
use crate::selection::SelectionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Console failures as HTTP responses
#[derive(Debug)]
pub struct ApiError(pub ConsoleError);

impl From<ConsoleError> for ApiError {
    fn from(e: ConsoleError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ConsoleError::NoSession => StatusCode::BAD_REQUEST,
            ConsoleError::UnknownEmergency(_) | ConsoleError::UnknownDrone(_) => {
                StatusCode::NOT_FOUND
            }
            ConsoleError::Selection(SelectionError::UnknownDrone(_)) => StatusCode::NOT_FOUND,
            ConsoleError::Selection(_) | ConsoleError::NoLocation(_) => StatusCode::CONFLICT,
            ConsoleError::Channel(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });

        (self.status(), body).into_response()
    }
}
