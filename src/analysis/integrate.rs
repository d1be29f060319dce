//! Composite Simpson quadrature over sampled `(x, y)` data.
//!
//! Follows the behaviour of `scipy.integrate.simpson` for explicit sample
//! points: spacing may be uneven, and `x` is used exactly as given, so a
//! decreasing or back-tracking voltage sweep contributes signed intervals.
//! With an even number of points (an odd number of intervals) Simpson's rule
//! covers all but the last interval, which gets the Cartwright correction for
//! irregular spacing.

use crate::error::AnalysisError;

/// Integrate `y` over `x`.
///
/// * 0 samples → [`AnalysisError::InsufficientData`]
/// * 1 sample  → `0.0`
/// * 2 samples → trapezoid `0.5 * |x1 - x0| * (y0 + y1)`
/// * ≥3        → composite Simpson
pub fn integrate(x: &[f64], y: &[f64]) -> Result<f64, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            voltages: x.len(),
            residuals: y.len(),
        });
    }

    match x.len() {
        0 => Err(AnalysisError::InsufficientData),
        1 => Ok(0.0),
        2 => Ok(0.5 * (x[1] - x[0]).abs() * (y[0] + y[1])),
        n if n % 2 == 1 => Ok(basic_simpson(x, y, n - 2)),
        n => Ok(basic_simpson(x, y, n - 3) + last_interval_correction(x, y)),
    }
}

/// `a / b`, or 0 when `b == 0` (matches numpy's `where=den != 0` guard).
fn guarded_div(a: f64, b: f64) -> f64 {
    if b != 0.0 {
        a / b
    } else {
        0.0
    }
}

/// Sum of parabolic segments starting at every even index below `stop`.
fn basic_simpson(x: &[f64], y: &[f64], stop: usize) -> f64 {
    (0..stop)
        .step_by(2)
        .map(|i| {
            let h0 = x[i + 1] - x[i];
            let h1 = x[i + 2] - x[i + 1];
            let hsum = h0 + h1;
            let hprod = h0 * h1;
            let h0_div_h1 = guarded_div(h0, h1);

            hsum / 6.0
                * (y[i] * (2.0 - guarded_div(1.0, h0_div_h1))
                    + y[i + 1] * (hsum * guarded_div(hsum, hprod))
                    + y[i + 2] * (2.0 - h0_div_h1))
        })
        .sum()
}

/// Contribution of the final interval when the point count is even,
/// fitted through the last three samples.
fn last_interval_correction(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let h0 = x[n - 2] - x[n - 3];
    let h1 = x[n - 1] - x[n - 2];

    let alpha = guarded_div(2.0 * h1 * h1 + 3.0 * h0 * h1, 6.0 * (h1 + h0));
    let beta = guarded_div(h1 * h1 + 3.0 * h0 * h1, 6.0 * h0);
    let eta = guarded_div(h1 * h1 * h1, 6.0 * h0 * (h0 + h1));

    alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3]
}
