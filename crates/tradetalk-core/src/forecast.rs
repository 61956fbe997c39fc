//! ARIMA(p, d, 0) fitting and projection over closing prices.
//!
//! The series is differenced `d` times, AR coefficients (no constant) are
//! estimated by conditional least squares, and the recursive forecast is
//! integrated back to price levels. Projected dates advance one calendar day
//! per step from the last observed bar.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{CoreError, ForecastPoint, Horizon, PriceSeries, ValidationError};

/// Relative pivot size below which the normal matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Model orders: autoregressive `p`, differencing `d`, moving-average `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const DEFAULT: Self = Self { p: 5, d: 1, q: 0 };

    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Fewest closes that still leave more equations than unknowns.
    pub const fn min_observations(self) -> usize {
        2 * self.p + self.d + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for ArimaOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Fitted model summary and projected points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub order: ArimaOrder,
    /// AR coefficients on the differenced scale, lag 1 first.
    pub coefficients: Vec<f64>,
    /// Residual variance of the conditional fit.
    pub sigma2: f64,
    /// Closes the model was fitted on.
    pub observations: usize,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForecastEngine {
    order: ArimaOrder,
}

impl ForecastEngine {
    pub const fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub fn forecast(&self, series: &PriceSeries, horizon: Horizon) -> Result<Forecast, CoreError> {
        let order = self.order;
        if order.q > 0 {
            return Err(CoreError::forecast_failed(
                ValidationError::UnsupportedMovingAverage { q: order.q }.to_string(),
            ));
        }

        let closes = series.closes();
        if closes.iter().any(|value| !value.is_finite()) {
            return Err(CoreError::forecast_failed("price series contains non-finite values"));
        }
        if closes.len() < order.min_observations() {
            return Err(CoreError::forecast_failed(format!(
                "{order} needs at least {} observations, got {}",
                order.min_observations(),
                closes.len()
            )));
        }

        let (differenced, tails) = difference(&closes, order.d);
        let (coefficients, sigma2) = fit_ar(&differenced, order.p)?;

        let steps = horizon.steps();
        let projected = integrate(project_ar(&differenced, &coefficients, steps), &tails);
        if projected.iter().any(|value| !value.is_finite()) {
            return Err(CoreError::forecast_failed("projection diverged to non-finite values"));
        }

        let last_ts = series
            .last()
            .map(|bar| bar.ts)
            .ok_or_else(|| CoreError::forecast_failed("price series is empty"))?;

        let mut points = Vec::with_capacity(steps);
        for (offset, predicted_price) in (1_i64..).zip(projected) {
            let date = last_ts.checked_add(Duration::days(offset)).ok_or_else(|| {
                CoreError::forecast_failed("forecast date is out of the representable range")
            })?;
            points.push(ForecastPoint {
                date,
                predicted_price,
            });
        }

        tracing::debug!(
            symbol = %series.symbol,
            %order,
            observations = closes.len(),
            sigma2,
            horizon = steps,
            "forecast fitted"
        );

        Ok(Forecast {
            order,
            coefficients,
            sigma2,
            observations: closes.len(),
            points,
        })
    }
}

/// Fits the default ARIMA(5,1,0) model.
pub fn forecast(series: &PriceSeries, horizon: Horizon) -> Result<Forecast, CoreError> {
    ForecastEngine::default().forecast(series, horizon)
}

/// Differences `d` times, returning the result and the last value seen at
/// every level (level 0 is the raw series).
fn difference(values: &[f64], d: usize) -> (Vec<f64>, Vec<f64>) {
    let mut current = values.to_vec();
    let mut tails = Vec::with_capacity(d);
    for _ in 0..d {
        tails.push(current.last().copied().unwrap_or_default());
        current = current.windows(2).map(|pair| pair[1] - pair[0]).collect();
    }
    (current, tails)
}

fn integrate(mut values: Vec<f64>, tails: &[f64]) -> Vec<f64> {
    for &tail in tails.iter().rev() {
        let mut level = tail;
        for value in &mut values {
            level += *value;
            *value = level;
        }
    }
    values
}

/// Conditional least squares AR(p) without intercept.
fn fit_ar(y: &[f64], p: usize) -> Result<(Vec<f64>, f64), CoreError> {
    if p == 0 {
        let sigma2 = y.iter().map(|v| v * v).sum::<f64>() / y.len().max(1) as f64;
        return Ok((Vec::new(), sigma2));
    }

    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for t in p..y.len() {
        for i in 0..p {
            let xi = y[t - 1 - i];
            xty[i] += xi * y[t];
            for j in 0..p {
                xtx[i][j] += xi * y[t - 1 - j];
            }
        }
    }

    let coefficients = solve(xtx, xty)?;
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(CoreError::forecast_failed("estimated coefficients are not finite"));
    }

    let equations = y.len() - p;
    let sse: f64 = (p..y.len())
        .map(|t| {
            let fitted: f64 = coefficients
                .iter()
                .enumerate()
                .map(|(i, c)| c * y[t - 1 - i])
                .sum();
            (y[t] - fitted).powi(2)
        })
        .sum();

    Ok((coefficients, sse / equations as f64))
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, CoreError> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return Err(CoreError::forecast_failed(
            "normal equations are singular (is the series constant?)",
        ));
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&l, &r| a[l][col].abs().total_cmp(&a[r][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return Err(CoreError::forecast_failed("normal equations are singular"));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

fn project_ar(history: &[f64], coefficients: &[f64], steps: usize) -> Vec<f64> {
    let mut extended = history.to_vec();
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        let next: f64 = coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c * extended[extended.len() - 1 - i])
            .sum();
        extended.push(next);
        out.push(next);
    }
    out
}
