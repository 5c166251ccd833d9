//! Load posting, listing and acceptance.
//!
//! Every handler here runs behind the bearer-token middleware; role checks
//! happen in the load service.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;
use crate::{
    AppState,
    middleware::CurrentUser,
    models::{Load, PostLoad},
};

/// Confirmation returned by post and accept.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoadActionResponse {
    pub message: String,
    pub load_id: Uuid,
}

#[tracing::instrument(name = "loads.post", skip_all)]
pub async fn post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Valid(Json(input)): Valid<Json<PostLoad>>,
) -> Result<(StatusCode, Json<LoadActionResponse>), ApiError> {
    let load = state.services.loads.post(&current.0, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoadActionResponse {
            message: "Load posted successfully".to_string(),
            load_id: load.id,
        }),
    ))
}

#[tracing::instrument(name = "loads.available", skip_all)]
pub async fn available(State(state): State<AppState>) -> Result<Json<Vec<Load>>, ApiError> {
    Ok(Json(state.services.loads.available().await?))
}

#[tracing::instrument(name = "loads.shipper_me", skip_all)]
pub async fn shipper_loads(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Load>>, ApiError> {
    Ok(Json(state.services.loads.posted_by(&current.0).await?))
}

#[tracing::instrument(name = "loads.my_active", skip_all)]
pub async fn my_active(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Load>>, ApiError> {
    Ok(Json(state.services.loads.active_for(&current.0).await?))
}

#[tracing::instrument(name = "loads.accept", skip(state, current))]
pub async fn accept(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(load_id): Path<Uuid>,
) -> Result<Json<LoadActionResponse>, ApiError> {
    state.services.loads.accept(&current.0, load_id).await?;

    Ok(Json(LoadActionResponse {
        message: "Load accepted".to_string(),
        load_id,
    }))
}
