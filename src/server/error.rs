//! Mapping of gallery and request errors onto HTTP responses.
//!
//! Every error body is `{"detail": "<message>"}`. Internal failures are
//! logged in full and answered with a fixed message for the operation.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use super::metrics::record_error;
use crate::gallery_store::{GalleryError, ValidationError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        ApiError {
            status,
            detail: detail.into(),
        }
    }

    /// Translates a store error raised while running `operation`.
    /// `failure_message` is the only text a 500 response carries.
    pub fn from_gallery(err: GalleryError, operation: &str, failure_message: &str) -> Self {
        record_error(err.kind(), operation);
        match err {
            GalleryError::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            GalleryError::Validation(details) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, details.to_string())
            }
            GalleryError::Conflict { .. } => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            GalleryError::SlugExhausted { .. }
            | GalleryError::Persistence(_)
            | GalleryError::Internal(_) => {
                error!("{} failed: {:#}", operation, err);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
            }
        }
    }

    fn unprocessable(detail: String) -> Self {
        warn!("Rejected request: {}", detail);
        record_error("validation", "request");
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::unprocessable(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
