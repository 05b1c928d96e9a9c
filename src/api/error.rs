//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::types::ErrorDetail;
use crate::validation::ValidationErrors;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug)]
pub enum ApiError {
    /// Body could not be read as JSON of the expected shape
    InvalidRequest(String),
    /// Body parsed but failed field constraints
    Validation(ValidationErrors),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiError::InvalidRequest(message) => ErrorDetail {
                code: "INVALID_REQUEST".to_string(),
                message,
                details: None,
            },
            ApiError::Validation(errors) => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message: errors.to_string(),
                details: serde_json::to_value(&errors.issues).ok(),
            },
        };

        debug!("Rejecting request: {}: {}", detail.code, detail.message);

        (StatusCode::BAD_REQUEST, Json(ErrorBody { error: detail })).into_response()
    }
}
