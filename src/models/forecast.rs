use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of loads posted on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Predicted number of loads for one future day.
///
/// Serialized as `{"date": "YYYY-MM-DD", "predicted_loads": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_loads: u64,
}
