use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AuthError,
    services::{ForecastError, ServiceError},
};

/// JSON error body: `{"detail": "...", "code": "..."}`.
///
/// The request-ID middleware adds a top-level `request_id` field on the way out.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub detail: String,
    /// Machine-readable error code
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Auth(AuthError),
    /// A server-side failure whose message is safe to show the caller.
    Unavailable(String),
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::BadRequest(msg) => ApiError::BadRequest(msg),
            ServiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Auth(err) => ApiError::Auth(err),
            ServiceError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                ApiError::Internal("An internal database error occurred".to_string())
            }
            ServiceError::Password(err) => {
                tracing::error!(error = %err, "Password hashing error");
                ApiError::Internal("An internal error occurred".to_string())
            }
            ServiceError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ApiError::Internal("An internal error occurred".to_string())
            }
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        let message = err.to_string();
        match err {
            ForecastError::NoData => ApiError::NotFound(message),
            ForecastError::InsufficientData { .. } => ApiError::BadRequest(message),
            ForecastError::ModelFit(_) | ForecastError::StoreUnavailable(_) => {
                tracing::error!(error = %message, "Forecast failed");
                ApiError::Unavailable(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Unavailable(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "forecast_failed", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        (status, Json(ErrorResponse::new(code, detail))).into_response()
    }
}
