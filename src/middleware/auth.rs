//! Bearer token middleware.
//!
//! Resolves `Authorization: Bearer <token>` to a stored user and makes it
//! available to handlers as `Extension<CurrentUser>`.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{AppState, auth::AuthError, models::User};

/// The authenticated user for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that rejects requests without a valid bearer token.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;
    let user = authenticate_bearer(&state, token).await?;

    tracing::debug!(email = %user.email, role = %user.role, "Request authenticated");

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

async fn authenticate_bearer(state: &AppState, token: &str) -> Result<User, AuthError> {
    let claims = state.tokens.verify(token)?;

    state
        .db
        .users()
        .get_by_email(&claims.sub)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::UnknownSubject)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
