//! Registration and token endpoints.

use axum::{Form, Json, extract::State, http::StatusCode};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ApiError;
use crate::{AppState, models::RegisterUser};

/// OAuth2 password-grant form. `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[tracing::instrument(name = "auth.register", skip(state, input))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<RegisterUser>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.services.users.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

#[tracing::instrument(name = "auth.token", skip(state, form), fields(email = %form.username))]
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state
        .services
        .users
        .login(&form.username, &form.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
