use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::SimulationError;
use crate::orchestration::{RefreshError, SimulateError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// The request was well-formed but the data cannot support it.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    /// Market data could not be fetched; the user may retry.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        AppError::DataUnavailable(err.to_string())
    }
}

impl From<SimulateError> for AppError {
    fn from(err: SimulateError) -> Self {
        match err {
            SimulateError::UnknownPair(_) => AppError::NotFound(err.to_string()),
            SimulateError::InvalidRequest(msg) => AppError::BadRequest(msg),
            SimulateError::DataUnavailable(_) => AppError::DataUnavailable(err.to_string()),
            SimulateError::Simulation(SimulationError::InvalidParameter(msg)) => {
                AppError::BadRequest(msg)
            }
            SimulateError::Simulation(e @ SimulationError::InsufficientData { .. }) => {
                AppError::Unprocessable(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::DataUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
