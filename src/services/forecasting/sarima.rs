//! Seasonal ARIMA fitted by conditional sum of squares.
//!
//! The model is `φ(B) Φ(B^s) (1-B)^d (1-B^s)^D y_t = θ(B) Θ(B^s) ε_t`. All
//! lag polynomials are expanded into plain coefficient vectors, so fitting
//! and forecasting share one recursion regardless of the orders involved.
//! Pre-sample values of the differenced series and of the innovations are
//! taken as zero. Stationarity and invertibility are not enforced.

use super::nelder_mead::{self, Options};
use crate::config::{ArimaOrder, SeasonalOrder};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SarimaError {
    #[error("series has {len} points; differencing needs more than {required}")]
    TooShort { len: usize, required: usize },

    #[error("series contains a non-finite value at index {0}")]
    NonFiniteInput(usize),

    #[error("sum of squares is not finite at the optimum")]
    NonFiniteObjective,

    #[error("forecast step {0} is not finite")]
    NonFiniteForecast(usize),
}

/// Model orders. Seasonal terms are ignored when the seasonal order is empty.
#[derive(Debug, Clone, Copy)]
pub struct Sarima {
    pub order: ArimaOrder,
    pub seasonal: SeasonalOrder,
}

/// Estimated coefficients plus the state needed to forecast.
#[derive(Debug, Clone)]
pub struct FittedSarima {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub css: f64,
    pub iterations: usize,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    ar_poly: Vec<f64>,
    ma_poly: Vec<f64>,
    diff_poly: Vec<f64>,
}

impl Sarima {
    pub fn new(order: ArimaOrder, seasonal: SeasonalOrder) -> Self {
        Self { order, seasonal }
    }

    fn period(&self) -> usize {
        if self.seasonal.is_empty() {
            0
        } else {
            self.seasonal.period
        }
    }

    fn param_count(&self) -> usize {
        let (sp, sq) = if self.seasonal.is_empty() {
            (0, 0)
        } else {
            (self.seasonal.p, self.seasonal.q)
        };
        self.order.p + self.order.q + sp + sq
    }

    /// Split a flat parameter vector into `(φ, θ, Φ, Θ)`.
    fn split<'a>(&self, params: &'a [f64]) -> (&'a [f64], &'a [f64], &'a [f64], &'a [f64]) {
        let (ar, rest) = params.split_at(self.order.p);
        let (ma, rest) = rest.split_at(self.order.q);
        let sp = if self.seasonal.is_empty() { 0 } else { self.seasonal.p };
        let (sar, sma) = rest.split_at(sp);
        (ar, ma, sar, sma)
    }

    /// `φ(B) Φ(B^s)` with the convention `a_0 = 1`, `a_k = -coef`.
    fn ar_polynomial(&self, params: &[f64]) -> Vec<f64> {
        let (ar, _, sar, _) = self.split(params);
        multiply(&lag_polynomial(ar, 1, -1.0), &lag_polynomial(sar, self.period(), -1.0))
    }

    /// `θ(B) Θ(B^s)` with the convention `m_0 = 1`, `m_k = +coef`.
    fn ma_polynomial(&self, params: &[f64]) -> Vec<f64> {
        let (_, ma, _, sma) = self.split(params);
        multiply(&lag_polynomial(ma, 1, 1.0), &lag_polynomial(sma, self.period(), 1.0))
    }

    /// `(1-B)^d (1-B^s)^D`
    fn differencing_polynomial(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for _ in 0..self.order.d {
            poly = multiply(&poly, &[1.0, -1.0]);
        }
        if !self.seasonal.is_empty() {
            let mut seasonal = vec![0.0; self.seasonal.period + 1];
            seasonal[0] = 1.0;
            seasonal[self.seasonal.period] = -1.0;
            for _ in 0..self.seasonal.d {
                poly = multiply(&poly, &seasonal);
            }
        }
        poly
    }

    /// Estimate coefficients by minimizing the conditional sum of squares.
    pub fn fit(&self, series: &[f64], max_iterations: usize) -> Result<FittedSarima, SarimaError> {
        if let Some(i) = series.iter().position(|v| !v.is_finite()) {
            return Err(SarimaError::NonFiniteInput(i));
        }

        let diff_poly = self.differencing_polynomial();
        let lost = diff_poly.len() - 1;
        if series.len() <= lost {
            return Err(SarimaError::TooShort {
                len: series.len(),
                required: lost,
            });
        }
        let differenced = apply_filter(&diff_poly, series);

        let objective = |params: &[f64]| {
            let a = self.ar_polynomial(params);
            let m = self.ma_polynomial(params);
            residuals(&a, &m, &differenced).iter().map(|e| e * e).sum::<f64>()
        };

        let x0 = vec![0.0; self.param_count()];
        let minimum = nelder_mead::minimize(
            objective,
            &x0,
            Options {
                max_iterations,
                ..Default::default()
            },
        );

        if !minimum.value.is_finite() || minimum.value == f64::MAX {
            return Err(SarimaError::NonFiniteObjective);
        }
        if !minimum.converged {
            tracing::debug!(
                iterations = minimum.iterations,
                css = minimum.value,
                "SARIMA fit hit the iteration limit"
            );
        }

        let ar_poly = self.ar_polynomial(&minimum.x);
        let ma_poly = self.ma_polynomial(&minimum.x);
        let residuals = residuals(&ar_poly, &ma_poly, &differenced);
        let (ar, ma, sar, sma) = self.split(&minimum.x);

        Ok(FittedSarima {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: sar.to_vec(),
            seasonal_ma: sma.to_vec(),
            css: minimum.value,
            iterations: minimum.iterations,
            history: series.to_vec(),
            differenced,
            residuals,
            ar_poly,
            ma_poly,
            diff_poly,
        })
    }
}

impl FittedSarima {
    /// Point forecasts for the `horizon` steps after the end of the series.
    ///
    /// Future innovations are zero. Forecasts of the differenced series are
    /// integrated back through the differencing polynomial.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, SarimaError> {
        let n = self.differenced.len();
        let mut w = self.differenced.clone();
        w.reserve(horizon);

        for t in n..n + horizon {
            let mut next = 0.0;
            for (k, a) in self.ar_poly.iter().enumerate().skip(1) {
                if let Some(prev) = t.checked_sub(k) {
                    next -= a * w[prev];
                }
            }
            for (k, m) in self.ma_poly.iter().enumerate().skip(1) {
                // Innovations at or after `n` are in the future and zero.
                if let Some(prev) = t.checked_sub(k)
                    && prev < n
                {
                    next += m * self.residuals[prev];
                }
            }
            w.push(next);
        }

        let mut y = self.history.clone();
        y.reserve(horizon);
        for (step, wt) in w[n..].iter().enumerate() {
            let t = y.len();
            let mut next = *wt;
            for (k, delta) in self.diff_poly.iter().enumerate().skip(1) {
                next -= delta * y[t - k];
            }
            if !next.is_finite() {
                return Err(SarimaError::NonFiniteForecast(step));
            }
            y.push(next);
        }

        Ok(y.split_off(self.history.len()))
    }
}

/// `1 + sign * (c_1 B^lag + c_2 B^{2 lag} + ...)`
fn lag_polynomial(coefs: &[f64], lag: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * lag + 1];
    poly[0] = 1.0;
    for (i, c) in coefs.iter().enumerate() {
        poly[(i + 1) * lag] = sign * c;
    }
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Apply a lag polynomial to a series, dropping the first `poly.len() - 1`
/// points that lack a full history.
fn apply_filter(poly: &[f64], series: &[f64]) -> Vec<f64> {
    let lost = poly.len() - 1;
    (lost..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Innovations implied by `a(B) w_t = m(B) ε_t` with zero pre-sample values.
fn residuals(a: &[f64], m: &[f64], w: &[f64]) -> Vec<f64> {
    let mut eps = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let mut e = 0.0;
        for (k, ak) in a.iter().enumerate() {
            if let Some(prev) = t.checked_sub(k) {
                e += ak * w[prev];
            }
        }
        for (k, mk) in m.iter().enumerate().skip(1) {
            if let Some(prev) = t.checked_sub(k) {
                e -= mk * eps[prev];
            }
        }
        eps.push(e);
    }
    eps
}
