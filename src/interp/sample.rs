//! Small 1-D interpolation helpers.

use crate::image::ImageF32;

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be ascending. Outside the sampled range the end values are
/// returned.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let i = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (f0, f1) = (fp[i - 1], fp[i]);
    if x1 == x0 {
        return f1;
    }
    f0 + (f1 - f0) * (x - x0) / (x1 - x0)
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Three-point quadratic interpolation down column `col` at fractional `row`.
///
/// The stencil is centred on the nearest row and shifted inwards at the
/// image border; bands shorter than three rows fall back to linear.
pub fn quadratic_column(img: &ImageF32, col: usize, row: f64) -> f64 {
    let h = img.h;
    match h {
        0 => return f64::NAN,
        1 => return img.get(col, 0) as f64,
        2 => {
            let t = row.clamp(0.0, 1.0);
            let (a, b) = (img.get(col, 0) as f64, img.get(col, 1) as f64);
            return a + (b - a) * t;
        }
        _ => {}
    }
    let center = (row.round().max(1.0) as usize).min(h - 2);
    let t = row - center as f64;
    let fm = img.get(col, center - 1) as f64;
    let f0 = img.get(col, center) as f64;
    let fp = img.get(col, center + 1) as f64;
    f0 + 0.5 * t * (fp - fm) + 0.5 * t * t * (fp - 2.0 * f0 + fm)
}
