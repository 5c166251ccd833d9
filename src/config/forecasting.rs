use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound on AR/MA orders. Higher orders overfit the short daily series
/// this service works with and slow the simplex search down considerably.
const MAX_ARMA_ORDER: usize = 5;

/// Upper bound on differencing orders.
const MAX_DIFFERENCING: usize = 2;

/// Non-seasonal ARIMA order `(p, d, q)`.
///
/// Written in TOML as a three-element array: `order = [1, 1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl From<[usize; 3]> for ArimaOrder {
    fn from([p, d, q]: [usize; 3]) -> Self {
        Self { p, d, q }
    }
}

impl From<ArimaOrder> for [usize; 3] {
    fn from(order: ArimaOrder) -> Self {
        [order.p, order.d, order.q]
    }
}

/// Seasonal order `(P, D, Q, s)`.
///
/// Written in TOML as a four-element array: `seasonal_order = [1, 1, 1, 7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order.
    pub p: usize,
    /// Seasonal differencing order.
    pub d: usize,
    /// Seasonal moving-average order.
    pub q: usize,
    /// Season length in observations (days).
    pub period: usize,
}

impl SeasonalOrder {
    pub const fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// A seasonal order that contributes nothing to the model.
    pub fn is_empty(&self) -> bool {
        self.p == 0 && self.d == 0 && self.q == 0
    }
}

impl From<[usize; 4]> for SeasonalOrder {
    fn from([p, d, q, period]: [usize; 4]) -> Self {
        Self { p, d, q, period }
    }
}

impl From<SeasonalOrder> for [usize; 4] {
    fn from(order: SeasonalOrder) -> Self {
        [order.p, order.d, order.q, order.period]
    }
}

/// Load volume forecasting configuration.
///
/// Defaults reproduce the weekly SARIMA(1,1,1)(1,1,1)[7] model with a 7-day
/// horizon and a 15-day minimum history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastingConfig {
    /// Non-seasonal `(p, d, q)` order.
    #[serde(default = "default_order")]
    pub order: ArimaOrder,

    /// Seasonal `(P, D, Q, s)` order.
    #[serde(default = "default_seasonal_order")]
    pub seasonal_order: SeasonalOrder,

    /// Number of days to forecast.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Minimum length of the daily series (in days) before a model is fitted.
    #[serde(default = "default_min_history_days")]
    pub min_history_days: usize,

    /// Iteration cap for the Nelder-Mead coefficient search.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Require a bearer token on the forecast endpoint.
    #[serde(default)]
    pub require_auth: bool,
}

impl Default for ForecastingConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            seasonal_order: default_seasonal_order(),
            horizon_days: default_horizon_days(),
            min_history_days: default_min_history_days(),
            max_iterations: default_max_iterations(),
            require_auth: false,
        }
    }
}

impl ForecastingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let order = self.order;
        let seasonal = self.seasonal_order;

        if order.p > MAX_ARMA_ORDER
            || order.q > MAX_ARMA_ORDER
            || seasonal.p > MAX_ARMA_ORDER
            || seasonal.q > MAX_ARMA_ORDER
        {
            return Err(ConfigError::Validation(format!(
                "forecasting AR/MA orders must be <= {MAX_ARMA_ORDER}"
            )));
        }
        if order.d > MAX_DIFFERENCING || seasonal.d > MAX_DIFFERENCING {
            return Err(ConfigError::Validation(format!(
                "forecasting differencing orders must be <= {MAX_DIFFERENCING}"
            )));
        }
        if !seasonal.is_empty() && seasonal.period < 2 {
            return Err(ConfigError::Validation(
                "forecasting.seasonal_order period must be at least 2".into(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(ConfigError::Validation(
                "forecasting.horizon_days must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "forecasting.max_iterations must be at least 1".into(),
            ));
        }

        let lost_to_differencing = order.d + seasonal.d * seasonal.period;
        if self.min_history_days <= lost_to_differencing {
            return Err(ConfigError::Validation(format!(
                "forecasting.min_history_days must exceed the {lost_to_differencing} \
                 observations consumed by differencing"
            )));
        }

        Ok(())
    }
}

fn default_order() -> ArimaOrder {
    ArimaOrder::new(1, 1, 1)
}

fn default_seasonal_order() -> SeasonalOrder {
    SeasonalOrder::new(1, 1, 1, 7)
}

fn default_horizon_days() -> usize {
    7
}

fn default_min_history_days() -> usize {
    15
}

fn default_max_iterations() -> usize {
    2000
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::LoadboardConfig;

    #[test]
    fn test_orders_round_trip_as_arrays() {
        let config = ForecastingConfig::default();
        let encoded = toml::to_string(&config).unwrap();
        assert!(encoded.contains("order = [1, 1, 1]"));
        assert!(encoded.contains("seasonal_order = [1, 1, 1, 7]"));
    }

    #[rstest]
    #[case::zero_horizon("horizon_days = 0")]
    #[case::zero_iterations("max_iterations = 0")]
    #[case::history_too_short("min_history_days = 8")]
    #[case::period_too_small("seasonal_order = [1, 0, 0, 1]")]
    #[case::order_too_large("order = [6, 1, 1]")]
    #[case::differencing_too_large("order = [1, 3, 1]")]
    fn test_invalid_forecasting_config(#[case] line: &str) {
        let toml = format!("[forecasting]\n{line}\n");
        let result = LoadboardConfig::from_str(&toml);
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "expected validation error for `{line}`"
        );
    }

    #[test]
    fn test_non_seasonal_model_accepts_any_period() {
        let toml = "[forecasting]\nseasonal_order = [0, 0, 0, 0]\nmin_history_days = 5\n";
        let config = LoadboardConfig::from_str(toml).unwrap();
        assert!(config.forecasting.seasonal_order.is_empty());
    }
}
