//! Column-wise derivative extrema with three-point parabolic refinement.
use crate::image::ImageF32;
use serde::Serialize;

/// Per-column rows of the strongest rising and falling transitions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EdgeRows {
    /// Row of the derivative maximum in each column.
    pub rising: Vec<f64>,
    /// Row of the derivative minimum in each column.
    pub falling: Vec<f64>,
}

impl EdgeRows {
    /// Midpoint between both edges per column.
    pub fn center(&self) -> Vec<f64> {
        self.rising
            .iter()
            .zip(&self.falling)
            .map(|(r, f)| 0.5 * (r + f))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rising.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rising.is_empty()
    }
}

/// Sub-sample offset of a peak from three equally spaced samples, in `[-0.5, 0.5]`.
#[inline]
pub fn parabolic_offset(f0: f64, f1: f64, f2: f64) -> f64 {
    let denom = f0 - 2.0 * f1 + f2;
    if denom.abs() <= f64::EPSILON * (f0.abs() + f1.abs() + f2.abs()).max(f64::MIN_POSITIVE) {
        return 0.0;
    }
    (0.5 * (f0 - f2) / denom).clamp(-0.5, 0.5)
}

/// Locate the derivative maximum and minimum in every column of `deriv`.
///
/// Ties resolve to the first (lowest) row. With `subpixel` set, interior
/// extrema are refined by fitting a parabola through their neighbours.
pub fn column_extrema(deriv: &ImageF32, subpixel: bool) -> EdgeRows {
    let (w, h) = (deriv.w, deriv.h);
    let mut rows = EdgeRows {
        rising: Vec::with_capacity(w),
        falling: Vec::with_capacity(w),
    };
    if h == 0 {
        return rows;
    }
    for x in 0..w {
        let mut imax = 0;
        let mut imin = 0;
        let mut vmax = deriv.get(x, 0);
        let mut vmin = vmax;
        for y in 1..h {
            let v = deriv.get(x, y);
            if v > vmax {
                vmax = v;
                imax = y;
            }
            if v < vmin {
                vmin = v;
                imin = y;
            }
        }
        rows.rising.push(refine(deriv, x, imax, subpixel, 1.0));
        rows.falling.push(refine(deriv, x, imin, subpixel, -1.0));
    }
    rows
}

fn refine(deriv: &ImageF32, x: usize, y: usize, subpixel: bool, sign: f64) -> f64 {
    if !subpixel || y == 0 || y + 1 >= deriv.h {
        return y as f64;
    }
    let f = |yy: usize| sign * deriv.get(x, yy) as f64;
    y as f64 + parabolic_offset(f(y - 1), f(y), f(y + 1))
}
