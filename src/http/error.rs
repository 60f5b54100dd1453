use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ClipError;

/// Generic message of every downstream failure; specifics go in `details`
pub const PROCESSING_ERROR: &str = "Error processing video";

/// Error returned by the HTTP handlers
#[derive(Debug)]
pub enum ApiError {
    /// Caller input problem, 400 `{ error }`
    BadRequest(String),
    /// Downstream failure, 500 `{ error, details }`
    Processing(String),
}

impl From<ClipError> for ApiError {
    fn from(err: ClipError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Processing(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Processing(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": PROCESSING_ERROR, "details": details })),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
