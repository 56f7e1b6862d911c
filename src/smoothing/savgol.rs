//! Savitzky-Golay polynomial smoothing.
//!
//! Suppresses observation noise while preserving the seasonal shape of the
//! series by fitting a low-degree polynomial over a sliding window. Edge
//! positions are handled by fitting a polynomial to the first/last window
//! of samples and evaluating it at the uncovered positions (the standard
//! "interp" boundary convention).

use crate::error::{PhenologyError, Result};

/// Apply a Savitzky-Golay filter to `values`.
///
/// `window` is forced odd (even inputs are bumped up by one). When the
/// series is shorter than the window, the window is reduced to the largest
/// odd number not exceeding the series length.
///
/// # Errors
/// * `DataInsufficient` on empty input.
/// * `WindowTooSmall` when the effective window is below `poly_order + 2`.
pub fn savgol_filter(values: &[f64], window: usize, poly_order: usize) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(PhenologyError::DataInsufficient);
    }

    let n = values.len();
    let w = effective_window(n, window, poly_order)?;
    let half = w / 2;

    let coeffs = savgol_coefficients(w, poly_order).ok_or_else(|| {
        PhenologyError::InvalidParameter("smoothing design matrix is singular".to_string())
    })?;

    let mut out = vec![0.0; n];

    // Interior: convolution with the centered least-squares coefficients.
    for i in half..n - half {
        let mut acc = 0.0;
        for (j, c) in coeffs.iter().enumerate() {
            acc += c * values[i - half + j];
        }
        out[i] = acc;
    }

    // Head: polynomial fit over the first window, evaluated at the
    // positions the centered convolution cannot cover.
    let head = fit_polynomial(&values[..w], poly_order).ok_or_else(|| {
        PhenologyError::InvalidParameter("edge polynomial fit is singular".to_string())
    })?;
    for (i, slot) in out.iter_mut().take(half).enumerate() {
        *slot = eval_polynomial(&head, i as f64 - half as f64);
    }

    // Tail: same with the last window.
    let tail = fit_polynomial(&values[n - w..], poly_order).ok_or_else(|| {
        PhenologyError::InvalidParameter("edge polynomial fit is singular".to_string())
    })?;
    for (local, slot) in out.iter_mut().enumerate().skip(n - half) {
        let x = (local - (n - w)) as f64 - half as f64;
        *slot = eval_polynomial(&tail, x);
    }

    Ok(out)
}

/// Resolve the effective (odd) window for a series of length `len`.
pub fn effective_window(len: usize, window: usize, poly_order: usize) -> Result<usize> {
    let mut w = if window % 2 == 0 { window + 1 } else { window };
    if len < w {
        // Largest odd number not exceeding the series length.
        w = if len % 2 == 0 { len.saturating_sub(1) } else { len };
    }

    let min = poly_order + 2;
    if w < min {
        return Err(PhenologyError::WindowTooSmall { window: w, min });
    }
    Ok(w)
}

/// Centered Savitzky-Golay smoothing coefficients for an odd `window` and
/// polynomial degree `poly_order`.
///
/// The smoothed center value equals the constant term of the least-squares
/// polynomial over window offsets `-h..=h`, which reduces to a fixed dot
/// product with the window samples.
pub fn savgol_coefficients(window: usize, poly_order: usize) -> Option<Vec<f64>> {
    let m = poly_order + 1;
    let half = (window / 2) as isize;

    // Gram matrix G[a][b] = sum_x x^(a+b) over centered offsets.
    let mut gram = vec![vec![0.0; m]; m];
    for x in -half..=half {
        let x = x as f64;
        let mut pow_a = 1.0;
        for a in 0..m {
            let mut pow_ab = pow_a;
            for b in 0..m {
                gram[a][b] += pow_ab;
                pow_ab *= x;
            }
            pow_a *= x;
        }
    }

    // Solve G z = e0; coefficient for offset x is the polynomial z evaluated at x.
    let mut e0 = vec![0.0; m];
    e0[0] = 1.0;
    let z = solve_symmetric(&gram, &e0)?;

    Some(
        (-half..=half)
            .map(|x| eval_polynomial(&z, x as f64))
            .collect(),
    )
}

/// Least-squares polynomial fit over `ys` sampled at centered offsets.
///
/// Returns coefficients in ascending degree about the window center
/// `(len - 1) / 2`; evaluation positions passed to [`eval_polynomial`]
/// must use the same centering.
fn fit_polynomial(ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = ys.len();
    if n <= degree {
        return None;
    }
    let m = degree + 1;
    let center = (n - 1) as f64 / 2.0;

    let mut gram = vec![vec![0.0; m]; m];
    let mut rhs = vec![0.0; m];

    for (j, &y) in ys.iter().enumerate() {
        let x = j as f64 - center;
        let mut pow_a = 1.0;
        for a in 0..m {
            let mut pow_ab = pow_a;
            for b in 0..m {
                gram[a][b] += pow_ab;
                pow_ab *= x;
            }
            rhs[a] += pow_a * y;
            pow_a *= x;
        }
    }

    solve_symmetric(&gram, &rhs)
}

/// Evaluate a polynomial (ascending coefficients) at `x` via Horner.
fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Solve a symmetric positive definite system via Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn output_length_matches_input_length() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        let smoothed = savgol_filter(&values, 51, 3).unwrap();
        assert_eq!(smoothed.len(), values.len());
    }

    #[test]
    fn window_is_reduced_for_short_series() {
        // 10 samples, configured window 51: effective window is 9.
        assert_eq!(effective_window(10, 51, 3).unwrap(), 9);
        assert_eq!(effective_window(9, 51, 3).unwrap(), 9);
        assert_eq!(effective_window(365, 51, 3).unwrap(), 51);

        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let smoothed = savgol_filter(&values, 51, 3).unwrap();
        assert_eq!(smoothed.len(), 10);
    }

    #[test]
    fn even_window_is_forced_odd() {
        assert_eq!(effective_window(365, 50, 3).unwrap(), 51);
    }

    #[test]
    fn too_small_window_is_rejected() {
        assert_eq!(
            effective_window(4, 51, 3),
            Err(PhenologyError::WindowTooSmall { window: 3, min: 5 })
        );
        assert!(matches!(
            savgol_filter(&[1.0, 2.0, 3.0, 4.0], 51, 3),
            Err(PhenologyError::WindowTooSmall { .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(savgol_filter(&[], 51, 3), Err(PhenologyError::DataInsufficient));
    }

    #[test]
    fn constant_series_passes_through() {
        let values = vec![0.42; 60];
        let smoothed = savgol_filter(&values, 11, 3).unwrap();
        for v in smoothed {
            assert_relative_eq!(v, 0.42, epsilon = 1e-10);
        }
    }

    #[test]
    fn cubic_polynomial_is_reproduced_exactly() {
        // A degree-3 filter reproduces cubic samples, edges included.
        let values: Vec<f64> = (0..30)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x * x - 2.0 * x * x + 3.0 * x - 1.0
            })
            .collect();

        let smoothed = savgol_filter(&values, 7, 3).unwrap();
        for (s, v) in smoothed.iter().zip(values.iter()) {
            assert_relative_eq!(*s, *v, epsilon = 1e-7, max_relative = 1e-9);
        }
    }

    #[test]
    fn alternating_noise_is_attenuated() {
        let noise = 0.1;
        let line: Vec<f64> = (0..40).map(|i| 0.5 + 0.01 * i as f64).collect();
        let noisy: Vec<f64> = line
            .iter()
            .enumerate()
            .map(|(i, &v)| v + if i % 2 == 0 { noise } else { -noise })
            .collect();

        let smoothed = savgol_filter(&noisy, 5, 2).unwrap();
        for i in 2..38 {
            assert!(
                (smoothed[i] - line[i]).abs() < noise,
                "index {} not attenuated",
                i
            );
        }
    }

    #[test]
    fn coefficients_sum_to_one() {
        // A smoothing kernel must preserve constants.
        let coeffs = savgol_coefficients(51, 3).unwrap();
        let sum: f64 = coeffs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn coefficients_match_known_quadratic_kernel() {
        // Window 5, degree 2: (-3, 12, 17, 12, -3) / 35.
        let coeffs = savgol_coefficients(5, 2).unwrap();
        let expected = [-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0];
        for (c, e) in coeffs.iter().zip(expected.iter()) {
            assert_relative_eq!(*c, *e, epsilon = 1e-10);
        }
    }
}
