//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use tripweave_types::error::{PlannerError, ValidationError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Planner(PlannerError),
    /// Malformed request (bad body, bad header).
    BadRequest(String),
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        AppError::Planner(e)
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Planner(PlannerError::Validation(ValidationError::NoPlan(_))) => {
                (StatusCode::CONFLICT, "NO_PLAN")
            }
            AppError::Planner(PlannerError::Validation(_)) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Planner(PlannerError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Planner(PlannerError::Validation(e)) => e.to_string(),
            AppError::Planner(PlannerError::Config(e)) => e.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        } else {
            tracing::debug!(code, %message, "request rejected");
        }

        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
