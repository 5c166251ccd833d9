//! Daily load volume forecasting.
//!
//! Posting timestamps are bucketed into a dense daily series, a seasonal
//! ARIMA model is fitted to it and its point forecasts are labeled with the
//! following calendar days. Nothing is cached: every call refits.

mod nelder_mead;
mod sarima;
mod series;

use std::sync::Arc;

use sarima::Sarima;
use series::{build_daily_series, format_forecast};

use crate::{
    config::ForecastingConfig,
    db::{DbError, LoadRepo},
    models::ForecastPoint,
};

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("No load data available to generate a forecast.")]
    NoData,

    #[error(
        "Not enough data to create a forecast. Need at least {required} days of data, \
         but only have {actual}."
    )]
    InsufficientData { required: usize, actual: usize },

    #[error("An error occurred while generating the forecast: {0}")]
    ModelFit(String),

    #[error("An error occurred while generating the forecast: {0}")]
    StoreUnavailable(#[from] DbError),
}

/// Forecasts daily load postings from the load store.
#[derive(Clone)]
pub struct ForecastService {
    loads: Arc<dyn LoadRepo>,
    config: ForecastingConfig,
}

impl ForecastService {
    pub fn new(loads: Arc<dyn LoadRepo>, config: ForecastingConfig) -> Self {
        Self { loads, config }
    }

    /// Forecast the configured horizon of days after the last posting date.
    #[tracing::instrument(skip(self))]
    pub async fn forecast(&self) -> Result<Vec<ForecastPoint>, ForecastError> {
        let timestamps = self.loads.list_posted_timestamps().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read load posting times");
            ForecastError::StoreUnavailable(e)
        })?;

        let series = build_daily_series(&timestamps)?;
        if series.len() < self.config.min_history_days {
            return Err(ForecastError::InsufficientData {
                required: self.config.min_history_days,
                actual: series.len(),
            });
        }

        let Some(last_date) = series.last().map(|d| d.date) else {
            return Err(ForecastError::NoData);
        };
        let values: Vec<f64> = series.iter().map(|d| d.count as f64).collect();

        let config = self.config.clone();
        let estimates = tokio::task::spawn_blocking(move || fit_and_forecast(&values, &config))
            .await
            .map_err(|e| ForecastError::ModelFit(format!("forecast task failed: {e}")))??;

        tracing::info!(
            events = timestamps.len(),
            days = series.len(),
            %last_date,
            "Generated load forecast"
        );

        Ok(format_forecast(last_date, &estimates))
    }
}

/// CPU-bound part of the pipeline. Runs off the async runtime.
fn fit_and_forecast(values: &[f64], config: &ForecastingConfig) -> Result<Vec<f64>, ForecastError> {
    let model = Sarima::new(config.order, config.seasonal_order);
    let fitted = model.fit(values, config.max_iterations).map_err(|e| {
        tracing::error!(error = %e, "SARIMA fit failed");
        ForecastError::ModelFit(e.to_string())
    })?;

    tracing::debug!(
        ar = ?fitted.ar,
        ma = ?fitted.ma,
        seasonal_ar = ?fitted.seasonal_ar,
        seasonal_ma = ?fitted.seasonal_ma,
        css = fitted.css,
        iterations = fitted.iterations,
        "Fitted SARIMA model"
    );

    fitted.forecast(config.horizon_days).map_err(|e| {
        tracing::error!(error = %e, "SARIMA forecast failed");
        ForecastError::ModelFit(e.to_string())
    })
}
