//! Double-logistic model of an annual green-up/senescence cycle.
//!
//! The model multiplies a growth sigmoid and a senescence sigmoid:
//!
//! ```text
//! f(x) = (L1 / (1 + exp(-k1 (x - x01))) + P01)
//!      * (1 - L2 / (1 + exp(-k2 (x - x02))) + P02)
//! ```
//!
//! with the growth slope constrained non-negative, the senescence slope
//! non-positive, and the two inflection days bounded to the first and
//! second half of the series respectively. Parameters are estimated by
//! bounded least squares, polishing the search with restarts from both a
//! midpoint-derived guess and a steepest-slope guess; repeated fits of
//! the same series are deterministic.

use crate::derivative::gradient;
use crate::error::{PhenologyError, Result};
use crate::fit::simplex::{minimize_bounded, Bounds, SimplexConfig, SimplexResult};

/// Parameters of the fitted double-logistic curve. Immutable after fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParameters {
    /// Growth amplitude.
    pub l1: f64,
    /// Growth slope (>= 0).
    pub k1: f64,
    /// Growth inflection day.
    pub x01: f64,
    /// Growth baseline offset (>= 0).
    pub p01: f64,
    /// Senescence amplitude (<= 0).
    pub l2: f64,
    /// Senescence slope (<= 0).
    pub k2: f64,
    /// Senescence inflection day.
    pub x02: f64,
    /// Senescence baseline offset.
    pub p02: f64,
}

impl FitParameters {
    /// Evaluate the model at day-index `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let growth = self.l1 / (1.0 + (-self.k1 * (x - self.x01)).exp()) + self.p01;
        let senescence = 1.0 - self.l2 / (1.0 + (-self.k2 * (x - self.x02)).exp()) + self.p02;
        growth * senescence
    }

    /// Evaluate the model at every day-index `0..len`.
    pub fn curve(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.evaluate(i as f64)).collect()
    }

    fn from_point(p: &[f64]) -> Self {
        Self {
            l1: p[0],
            k1: p[1],
            x01: p[2],
            p01: p[3],
            l2: p[4],
            k2: p[5],
            x02: p[6],
            p02: p[7],
        }
    }
}

/// Configuration for the double-logistic fit.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Settings for the underlying simplex search.
    pub simplex: SimplexConfig,
    /// Maximum number of simplex restarts per starting point.
    pub restarts: usize,
    /// Stop restarting a start once one more pass improves the residual
    /// sum of squares by no more than this.
    pub restart_tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            simplex: SimplexConfig::default(),
            restarts: 30,
            restart_tolerance: 1e-10,
        }
    }
}

/// Result of fitting the double-logistic model to a smoothed series.
#[derive(Debug, Clone)]
pub struct DoubleLogisticFit {
    /// Fitted parameters, all within their declared bounds.
    pub params: FitParameters,
    /// Model evaluated at every day-index of the input.
    pub fitted: Vec<f64>,
    /// Sum of squared residuals at the optimum.
    pub sse: f64,
    /// Iterations spent by the optimizer.
    pub iterations: usize,
}

// Minimum series length for the midpoint-derived guess and bounds to make
// sense; also the number of free parameters.
const MIN_FIT_LEN: usize = 8;

/// Data-derived initial guess for a series of `values`.
///
/// Ordered as (L1, k1, x01, P01, L2, k2, x02, P02).
pub fn initial_guess(values: &[f64]) -> [f64; 8] {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mid = (values.len() / 2) as f64;
    [max, 0.1, mid / 2.0, min, -max, -0.1, mid + mid / 2.0, min]
}

/// Second starting point derived from the steepest observed rise and fall.
///
/// A logistic reaches its maximum slope `L k / 4` at the inflection day, so
/// the largest day-to-day rise and fall locate the inflections and scale
/// the slopes directly from the data. Falls back to [`initial_guess`] when
/// the series has no spread.
fn steepest_slope_guess(values: &[f64]) -> [f64; 8] {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let amplitude = max - min;
    if !amplitude.is_finite() || amplitude <= 0.0 {
        return initial_guess(values);
    }

    let slopes = gradient(values);
    let mut rise_at = 0;
    let mut fall_at = 0;
    for (i, &s) in slopes.iter().enumerate() {
        if s > slopes[rise_at] {
            rise_at = i;
        }
        if s < slopes[fall_at] {
            fall_at = i;
        }
    }

    let mid = (values.len() / 2) as f64;
    [
        amplitude,
        (4.0 * slopes[rise_at] / amplitude).max(0.0),
        (rise_at as f64).clamp(0.0, mid),
        min,
        -amplitude,
        (4.0 * slopes[fall_at] / amplitude).min(0.0),
        (fall_at as f64).clamp(mid, values.len() as f64),
        min,
    ]
}

/// Parameter bounds for a series of length `len`.
pub fn parameter_bounds(len: usize) -> Bounds {
    let mid = (len / 2) as f64;
    vec![
        (0.0, f64::INFINITY),          // L1
        (0.0, f64::INFINITY),          // k1
        (0.0, mid),                    // x01
        (0.0, f64::INFINITY),          // P01
        (f64::NEG_INFINITY, 0.0),      // L2
        (f64::NEG_INFINITY, 0.0),      // k2
        (mid, len as f64),             // x02
        (f64::NEG_INFINITY, f64::INFINITY), // P02
    ]
}

/// Fit the double-logistic model to `values` by bounded least squares.
///
/// # Errors
/// * `FitBoundsInvalid` when the series is too short for midpoint-derived
///   bounds or the initial guess falls outside them.
/// * `FitDidNotConverge` when the optimizer exhausts its iteration budget.
pub fn fit_double_logistic(values: &[f64], config: &FitConfig) -> Result<DoubleLogisticFit> {
    if values.len() < MIN_FIT_LEN {
        return Err(PhenologyError::FitBoundsInvalid(format!(
            "series too short for midpoint-derived bounds: {} < {}",
            values.len(),
            MIN_FIT_LEN
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PhenologyError::InvalidParameter(
            "fit input must be finite".to_string(),
        ));
    }

    let init = initial_guess(values);
    let bounds = parameter_bounds(values.len());
    validate_guess(&init, &bounds)?;

    let sse = |p: &[f64]| -> f64 {
        let params = FitParameters::from_point(p);
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let r = y - params.evaluate(i as f64);
                r * r
            })
            .sum()
    };

    // Reseeding a collapsed simplex at its own optimum restores full step
    // sizes, so each start is polished until one more pass stops improving.
    let mut total_iterations = 0;
    let mut polish = |start: &[f64]| -> Result<SimplexResult> {
        let mut result = minimize_bounded(&sse, start, &bounds, &config.simplex);
        total_iterations += result.iterations;
        if !result.converged {
            return Err(PhenologyError::FitDidNotConverge {
                iterations: total_iterations,
            });
        }
        for _ in 0..config.restarts {
            let next = minimize_bounded(&sse, &result.point, &bounds, &config.simplex);
            total_iterations += next.iterations;
            if !next.converged {
                return Err(PhenologyError::FitDidNotConverge {
                    iterations: total_iterations,
                });
            }
            let improvement = result.value - next.value;
            if next.value < result.value {
                result = next;
            }
            if improvement <= config.restart_tolerance {
                break;
            }
        }
        Ok(result)
    };

    let mut best = polish(&init)?;
    let slope_start = steepest_slope_guess(values);
    if slope_start != init {
        let alternative = polish(&slope_start)?;
        if alternative.value < best.value {
            best = alternative;
        }
    }

    let params = FitParameters::from_point(&best.point);
    let fitted = params.curve(values.len());

    Ok(DoubleLogisticFit {
        params,
        fitted,
        sse: best.value,
        iterations: total_iterations,
    })
}

fn validate_guess(init: &[f64; 8], bounds: &Bounds) -> Result<()> {
    const NAMES: [&str; 8] = ["L1", "k1", "x01", "P01", "L2", "k2", "x02", "P02"];
    for ((&x, &(lo, hi)), name) in init.iter().zip(bounds.iter()).zip(NAMES.iter()) {
        if lo > hi {
            return Err(PhenologyError::FitBoundsInvalid(format!(
                "{name}: lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        if x < lo || x > hi {
            return Err(PhenologyError::FitBoundsInvalid(format!(
                "{name}: initial guess {x} outside [{lo}, {hi}]"
            )));
        }
    }
    Ok(())
}
