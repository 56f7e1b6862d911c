//! Discrete numerical differentiation of the fitted curve.
//!
//! Uses the central-difference gradient with one-sided differences at both
//! ends, so every derivative series keeps the length of its input. The
//! third derivative is the gradient applied three times; the slight edge
//! attenuation this introduces is accepted, not corrected.

/// Numerical gradient of `values` at unit spacing.
///
/// Interior points use the central difference `(y[i+1] - y[i-1]) / 2`,
/// the first and last point a one-sided difference. Degenerate inputs:
/// empty stays empty, a single sample has zero slope.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => return vec![],
        1 => return vec![0.0],
        _ => {}
    }

    let mut out = vec![0.0; n];
    out[0] = values[1] - values[0];
    out[n - 1] = values[n - 1] - values[n - 2];
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }
    out
}

/// Apply [`gradient`] `n` times in succession.
pub fn nth_gradient(values: &[f64], n: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..n {
        out = gradient(&out);
    }
    out
}

/// Third derivative via three successive gradient passes.
pub fn third_derivative(values: &[f64]) -> Vec<f64> {
    nth_gradient(values, 3)
}
