use axum::{Json, extract::State};

use super::ApiError;
use crate::{AppState, models::ForecastPoint};

/// Forecast daily load postings for the configured horizon.
///
/// Refits the model on every call; responses are ascending by date.
#[tracing::instrument(name = "predictions.loads_forecast", skip(state))]
pub async fn loads_forecast(
    State(state): State<AppState>,
) -> Result<Json<Vec<ForecastPoint>>, ApiError> {
    Ok(Json(state.services.forecasting.forecast().await?))
}
