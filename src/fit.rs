//! Straight-line regression with iterative outlier trimming.
//!
//! V edges are close to linear over the fitted span and suffer only from
//! occasional isolated outliers (noise spikes, columns where the two edges
//! merge), so a few rounds of least squares with residual trimming are
//! sufficient and much cheaper than a full robust estimator.

use crate::error::{Result, VcutError};
use crate::line::Line;
use serde::{Deserialize, Serialize};

/// Default number of least-squares rounds.
pub const DEFAULT_FIT_ITERATIONS: usize = 3;
/// Default trimming threshold in multiples of the residual RMS.
pub const DEFAULT_FIT_N_STD_DEVS: f64 = 2.0;

/// Minimum number of points a trimming round must leave to be accepted.
const MIN_TRIMMED_POINTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobustFitOptions {
    /// Total number of least-squares rounds (the first is plain OLS).
    pub iterations: usize,
    /// Points with |residual| ≥ `n_std_devs`·RMS are discarded between rounds.
    pub n_std_devs: f64,
}

impl Default for RobustFitOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_FIT_ITERATIONS,
            n_std_devs: DEFAULT_FIT_N_STD_DEVS,
        }
    }
}

/// `y = slope·x + intercept`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of points used by the final round.
    pub inliers: usize,
    /// Residual RMS of the final round over its inliers.
    pub rms: f64,
}

impl LinearFit {
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// The fitted carrier as a unit-x [`Line`].
    pub fn line(&self) -> Line {
        Line::from_slope_intercept(self.slope, self.intercept)
    }
}

/// Ordinary least squares.
pub fn least_squares(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(VcutError::invalid(
            "y",
            format!("length {} does not match x length {}", y.len(), x.len()),
        ));
    }
    let n = x.len();
    if n < 2 {
        return Err(VcutError::degenerate_fit(format!("{n} point(s)")));
    }
    let inv_n = 1.0 / n as f64;
    let mx = x.iter().sum::<f64>() * inv_n;
    let my = y.iter().sum::<f64>() * inv_n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        sxx += dx * dx;
        sxy += dx * (yi - my);
    }
    if sxx <= f64::EPSILON * (1.0 + mx * mx) * n as f64 {
        return Err(VcutError::degenerate_fit("x values have no spread"));
    }
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let ss: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - (slope * xi + intercept);
            r * r
        })
        .sum();
    Ok(LinearFit {
        slope,
        intercept,
        inliers: n,
        rms: (ss * inv_n).sqrt(),
    })
}

/// Least squares with residual trimming between rounds.
///
/// Each round after the first discards points whose residual against the
/// previous fit is at least `n_std_devs` times the residual RMS and refits.
/// A round that would leave fewer than three points ends the iteration and
/// the previous fit is returned.
pub fn robust_fit(x: &[f64], y: &[f64], opts: &RobustFitOptions) -> Result<LinearFit> {
    let mut fit = least_squares(x, y)?;
    let mut xs = x.to_vec();
    let mut ys = y.to_vec();
    for _ in 1..opts.iterations.max(1) {
        let threshold = opts.n_std_devs * fit.rms;
        let (kx, ky): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(&ys)
            .filter(|&(&xi, &yi)| (yi - fit.eval(xi)).abs() < threshold)
            .map(|(&xi, &yi)| (xi, yi))
            .unzip();
        if kx.len() < MIN_TRIMMED_POINTS || kx.len() == xs.len() {
            break;
        }
        match least_squares(&kx, &ky) {
            Ok(next) => {
                fit = next;
                xs = kx;
                ys = ky;
            }
            Err(_) => break,
        }
    }
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_outliers() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut y: Vec<f64> = x.iter().map(|&xi| 2.0 * xi + 1.0).collect();
        // 5% bounded outliers spread over the range.
        for (k, i) in [10usize, 30, 50, 70, 90].into_iter().enumerate() {
            y[i] += 40.0 + 5.0 * k as f64;
        }
        (x, y)
    }

    #[test]
    fn ols_recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = least_squares(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(fit.rms < 1e-12);
    }

    #[test]
    fn robust_fit_ignores_outliers() {
        let (x, y) = line_with_outliers();
        let plain = least_squares(&x, &y).unwrap();
        let robust = robust_fit(&x, &y, &RobustFitOptions::default()).unwrap();

        assert!((robust.slope - 2.0).abs() / 2.0 < 0.01, "slope {}", robust.slope);
        assert!(
            (robust.intercept - 1.0).abs() < 0.01,
            "intercept {}",
            robust.intercept
        );
        assert_eq!(robust.inliers, 95);
        assert!(
            (plain.intercept - 1.0).abs() > 0.1,
            "plain OLS should be pulled by outliers, intercept {}",
            plain.intercept
        );
    }

    #[test]
    fn single_iteration_is_plain_ols() {
        let (x, y) = line_with_outliers();
        let opts = RobustFitOptions {
            iterations: 1,
            ..Default::default()
        };
        assert_eq!(robust_fit(&x, &y, &opts).unwrap(), least_squares(&x, &y).unwrap());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            least_squares(&[1.0], &[2.0]),
            Err(VcutError::DegenerateFit { .. })
        ));
        assert!(matches!(
            least_squares(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(VcutError::DegenerateFit { .. })
        ));
    }
}
