//! Separable 5-tap Sobel derivative across the rows of a band.
//!
//! The derivative kernel `[-1, -2, 0, 2, 1]` runs down each column (across
//! the V edges); the smoothing kernel `[1, 4, 6, 4, 1]` runs along each row
//! (along the line). Borders are reflected without repeating the edge pixel
//! (`reflect-101`: `… 2 1 | 0 1 2 … n-2 n-1 | n-2 n-3 …`).
//!
//! Complexity: O(W·H) with one temporary buffer.
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel5 = [f32; 5];

const SOBEL5_DERIV: Kernel5 = [-1.0, -2.0, 0.0, 2.0, 1.0];
const SOBEL5_SMOOTH: Kernel5 = [1.0, 4.0, 6.0, 4.0, 1.0];

/// Map a possibly out-of-range index into `0..n` by reflect-101.
#[inline]
fn reflect101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let last = n as isize - 1;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Derivative of `img` along `y`, smoothed along `x`.
///
/// Positive responses mark rows where intensity increases with the row index.
pub fn sobel5_rows(img: &ImageF32) -> ImageF32 {
    let (w, h) = (img.w, img.h);
    let mut smooth = ImageF32::new(w, h);
    let mut out = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    for y in 0..h {
        let src = img.row(y);
        let dst = smooth.row_mut(y);
        for (x, d) in dst.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, &wk) in SOBEL5_SMOOTH.iter().enumerate() {
                acc += wk * src[reflect101(x as isize + k as isize - 2, w)];
            }
            *d = acc;
        }
    }

    for y in 0..h {
        let rows: [&[f32]; 5] =
            std::array::from_fn(|k| smooth.row(reflect101(y as isize + k as isize - 2, h)));
        let dst = out.row_mut(y);
        for (x, d) in dst.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (row, &wk) in rows.iter().zip(SOBEL5_DERIV.iter()) {
                acc += wk * row[x];
            }
            *d = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        let idx: Vec<usize> = (-2..7).map(|i| reflect101(i, 5)).collect();
        assert_eq!(idx, vec![2, 1, 0, 1, 2, 3, 4, 3, 2]);
        assert_eq!(reflect101(-3, 1), 0);
    }

    #[test]
    fn vertical_ramp_has_constant_response() {
        let img = ImageF32::from_fn(9, 11, |_, y| 2.0 * y as f32);
        let d = sobel5_rows(&img);
        // Σ smooth = 16, Σ k·deriv = 8, slope 2 → 256 in the interior.
        for y in 2..9 {
            for x in 0..9 {
                assert!((d.get(x, y) - 256.0).abs() < 1e-3, "({x},{y}) = {}", d.get(x, y));
            }
        }
    }

    #[test]
    fn horizontal_structure_gives_no_response() {
        let img = ImageF32::from_fn(12, 7, |x, _| (x % 3) as f32);
        let d = sobel5_rows(&img);
        assert!(d.data.iter().all(|v| v.abs() < 1e-6));
    }
}
