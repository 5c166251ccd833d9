use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::routes::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header on a protected route
    #[error("Bearer token required")]
    MissingCredentials,

    /// Signature, algorithm or claims check failed
    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("Bearer token has expired")]
    ExpiredToken,

    /// Token verified but its subject no longer exists
    #[error("Token subject not found")]
    UnknownSubject,

    /// Login rejected. Same error for unknown email and wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Authentication error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            AuthError::MissingCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Could not validate credentials",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Incorrect email or password",
            ),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Authentication failed internally");
                let body = ErrorResponse::new("internal_error", "Internal server error");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        tracing::debug!(reason = %self, "Authentication rejected");

        let mut response = (status, Json(ErrorResponse::new(code, detail))).into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Bearer"),
        );
        response
    }
}
