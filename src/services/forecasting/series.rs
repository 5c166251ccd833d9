use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::ForecastError;
use crate::models::{DailyCount, ForecastPoint};

/// Bucket timestamps into UTC calendar days, zero-filling gaps.
///
/// The result covers every day from the earliest to the latest event,
/// inclusive, in ascending order.
pub fn build_daily_series(timestamps: &[DateTime<Utc>]) -> Result<Vec<DailyCount>, ForecastError> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for ts in timestamps {
        *counts.entry(ts.date_naive()).or_default() += 1;
    }

    let (Some((&first, _)), Some((&last, _))) = (counts.first_key_value(), counts.last_key_value())
    else {
        return Err(ForecastError::NoData);
    };

    Ok(first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect())
}

/// Label raw model output with the days after `last_date`.
///
/// Estimates are rounded half-to-even and negative values clamp to zero.
pub fn format_forecast(last_date: NaiveDate, estimates: &[f64]) -> Vec<ForecastPoint> {
    last_date
        .iter_days()
        .skip(1)
        .zip(estimates)
        .map(|(date, estimate)| ForecastPoint {
            date,
            predicted_loads: estimate.round_ties_even().max(0.0) as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert!(matches!(build_daily_series(&[]), Err(ForecastError::NoData)));
    }

    #[test]
    fn test_single_day() {
        let series =
            build_daily_series(&[ts(2025, 1, 3, 1), ts(2025, 1, 3, 12), ts(2025, 1, 3, 23)])
                .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, date(2025, 1, 3));
        assert_eq!(series[0].count, 3);
    }

    #[test]
    fn test_gaps_zero_filled_and_sorted() {
        // Unordered input with a two-day gap
        let input = [ts(2025, 1, 5, 9), ts(2025, 1, 1, 9), ts(2025, 1, 2, 9), ts(2025, 1, 5, 18)];
        let series = build_daily_series(&input).unwrap();

        let counts: Vec<u64> = series.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![1, 1, 0, 0, 2]);
        assert_eq!(series.first().unwrap().date, date(2025, 1, 1));
        assert_eq!(series.last().unwrap().date, date(2025, 1, 5));
    }

    #[test]
    fn test_contiguous_and_sums_to_input_length() {
        let base = ts(2024, 2, 20, 6);
        let input: Vec<DateTime<Utc>> = (0..50)
            .map(|i| base + Duration::hours(i * 17 % 400))
            .collect();
        let series = build_daily_series(&input).unwrap();

        for pair in series.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
        assert_eq!(series.iter().map(|d| d.count).sum::<u64>(), 50);
    }

    #[test]
    fn test_buckets_by_utc_date() {
        let late = chrono::FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 2, 2, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let series = build_daily_series(&[late]).unwrap();
        assert_eq!(series[0].date, date(2025, 1, 1));
    }

    #[test]
    fn test_format_rounds_and_clamps() {
        let points = format_forecast(date(2025, 12, 30), &[0.5, 1.5, 2.4999, -3.7, -0.4]);

        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 12, 31),
                date(2026, 1, 1),
                date(2026, 1, 2),
                date(2026, 1, 3),
                date(2026, 1, 4),
            ]
        );
        let values: Vec<u64> = points.iter().map(|p| p.predicted_loads).collect();
        assert_eq!(values, vec![0, 2, 2, 0, 0]);
    }
}
