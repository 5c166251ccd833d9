use axum::{Extension, Json};

use crate::{middleware::CurrentUser, models::UserProfile};

/// Profile of the bearer token's user.
#[tracing::instrument(name = "users.me", skip_all)]
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserProfile> {
    let CurrentUser(user) = current;
    Json(user.into())
}
