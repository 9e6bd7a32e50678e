//! Level crossings of sampled curves.

use super::sample::{interp, linspace};
use super::spline::CubicSpline;
use crate::error::{Result, VcutError};

/// Minimum support for the spline fit; shorter inputs are resampled linearly.
const MIN_SPLINE_SAMPLES: usize = 5;

/// Abscissa of the `occurrence`-th crossing of `y = target` (0 = first, ascending x).
///
/// Non-finite pairs are dropped. Descending input is reversed, then sorted and
/// duplicate abscissae merged by averaging. The curve is fitted with a cubic
/// smoothing spline (`smoothing` bounds its residual sum of squares, `0`
/// interpolates) and the roots of `spline − target` are returned in order.
pub fn find_crossing(
    x: &[f64],
    y: &[f64],
    target: f64,
    occurrence: usize,
    smoothing: f64,
) -> Result<f64> {
    if x.len() != y.len() {
        return Err(VcutError::invalid(
            "y",
            format!("length {} does not match x length {}", y.len(), x.len()),
        ));
    }
    let no_crossing = |samples: usize| VcutError::NoCrossing {
        target,
        occurrence,
        samples,
    };

    let mut pts: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b - target))
        .collect();
    if pts.len() >= 2 && pts[1].0 < pts[0].0 {
        pts.reverse();
    }
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (mut xs, mut ys) = merge_duplicates(&pts);
    if xs.len() < 2 {
        return Err(no_crossing(xs.len()));
    }
    if xs.len() < MIN_SPLINE_SAMPLES {
        let xn = linspace(xs[0], xs[xs.len() - 1], MIN_SPLINE_SAMPLES);
        ys = xn.iter().map(|&v| interp(v, &xs, &ys)).collect();
        xs = xn;
    }

    let spline = CubicSpline::smoothing(&xs, &ys, smoothing)?;
    let roots = spline.roots();
    log::debug!(
        "find_crossing: y={target} over {} samples -> {} root(s)",
        xs.len(),
        roots.len()
    );
    roots
        .get(occurrence)
        .copied()
        .ok_or_else(|| no_crossing(xs.len()))
}

/// Collapse runs of equal abscissae (input sorted) into their mean ordinate.
fn merge_duplicates(pts: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    let mut xs: Vec<f64> = Vec::with_capacity(pts.len());
    let mut ys: Vec<f64> = Vec::with_capacity(pts.len());
    let mut run = 0usize;
    for &(px, py) in pts {
        match xs.last() {
            Some(&last) if last == px => {
                run += 1;
                let k = ys.len() - 1;
                ys[k] += (py - ys[k]) / run as f64;
            }
            _ => {
                xs.push(px);
                ys.push(py);
                run = 1;
            }
        }
    }
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_crossing_between_samples() {
        let x = find_crossing(&[0.0, 1.0, 2.0, 3.0, 4.0], &[4.0, 1.0, 0.0, -1.0, -4.0], 0.0, 0, 0.0)
            .unwrap();
        assert!(x > 1.0 && x <= 2.0 + 1e-9, "x = {x}");
    }

    #[test]
    fn descending_input_is_reversed() {
        let xs = [4.0, 3.0, 2.0, 1.0, 0.0, -1.0];
        let ys: Vec<f64> = xs.iter().map(|&v| 0.5 * v).collect();
        let x = find_crossing(&xs, &ys, 0.75, 0, 0.0).unwrap();
        assert!((x - 1.5).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn short_inputs_are_resampled() {
        let x = find_crossing(&[0.0, 10.0], &[1.0, 0.0], 0.5, 0, 0.0).unwrap();
        assert!((x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let xs = [0.0, 1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0];
        let ys = [1.0, 0.8, 0.6, f64::INFINITY, 0.2, 0.0, -0.2];
        let x = find_crossing(&xs, &ys, 0.5, 0, 0.0).unwrap();
        assert!(x > 1.0 && x < 4.0, "x = {x}");
    }

    #[test]
    fn selects_later_occurrences() {
        let xs: Vec<f64> = (0..=40).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|v| v.cos()).collect();
        let first = find_crossing(&xs, &ys, 0.0, 0, 0.0).unwrap();
        let second = find_crossing(&xs, &ys, 0.0, 1, 0.0).unwrap();
        assert!((first - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
        assert!((second - 1.5 * std::f64::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn missing_crossing_is_reported() {
        let r = find_crossing(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0, 5.0], 10.0, 0, 0.0);
        assert!(matches!(r, Err(VcutError::NoCrossing { .. })));
        let r = find_crossing(&[1.0, 1.0], &[0.0, 1.0], 0.5, 0, 0.0);
        assert!(matches!(r, Err(VcutError::NoCrossing { samples: 1, .. })));
    }
}
