//! Resampling an image into a band that follows a line.
//!
//! The band has `width` rows at perpendicular offsets
//! `-(width-1)/2 ..= (width-1)/2` and `round(length)` columns spaced one pixel
//! apart along the line. Resampling strategies implement [`Rectifier`];
//! [`BilinearRectifier`] is the default.

mod band;

pub use band::RectifiedBand;

use crate::error::{Result, VcutError};
use crate::image::{ImageF32, ImageViewMut};
use crate::line::Line;

pub trait Rectifier {
    /// Resample `image` along `line` into a band of `width` rows.
    fn rectify(&self, image: &ImageF32, line: &Line, width: usize) -> Result<RectifiedBand>;
}

/// Bilinear resampling; samples outside the image repeat the border pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct BilinearRectifier;

impl Rectifier for BilinearRectifier {
    fn rectify(&self, image: &ImageF32, line: &Line, width: usize) -> Result<RectifiedBand> {
        let (origin, direction, normal, len) = band_frame(line, width)?;
        let half = (width / 2) as f64;
        let mut out = ImageF32::new(len, width);
        for r in 0..width {
            let off = r as f64 - half;
            let base = [origin[0] + off * normal[0], origin[1] + off * normal[1]];
            let row = out.row_mut(r);
            for (c, px) in row.iter_mut().enumerate() {
                let t = c as f64;
                *px = bilinear_clamped(
                    image,
                    base[0] + t * direction[0],
                    base[1] + t * direction[1],
                );
            }
        }
        log::debug!(
            "rectify: {}x{} band from ({:.1},{:.1}) dir ({:.4},{:.4})",
            len,
            width,
            origin[0],
            origin[1],
            direction[0],
            direction[1]
        );
        Ok(RectifiedBand {
            image: out,
            origin,
            direction,
            normal,
        })
    }
}

/// Validate `width` and derive the sampling frame of a band along `line`.
fn band_frame(line: &Line, width: usize) -> Result<([f64; 2], [f64; 2], [f64; 2], usize)> {
    if width == 0 || width % 2 == 0 {
        return Err(VcutError::invalid(
            "max_width",
            format!("{width} must be odd and positive"),
        ));
    }
    if line.is_degenerate() {
        return Err(VcutError::degenerate_line("zero-length line"));
    }
    let len = (line.length().round() as usize).max(1);
    Ok((line.p0, line.unit_direction(), line.normal(), len))
}

/// Bilinear sample at `(x, y)` with replicated borders.
///
/// Both masked and unmasked bands stay positive off the image, so the
/// relative contrast remains defined there.
#[inline]
pub(crate) fn bilinear_clamped(img: &ImageF32, x: f64, y: f64) -> f32 {
    if !x.is_finite() || !y.is_finite() || img.w == 0 || img.h == 0 {
        return 0.0;
    }
    let xf = x.floor();
    let yf = y.floor();
    let tx = (x - xf) as f32;
    let ty = (y - yf) as f32;
    let (max_x, max_y) = (img.w as f64 - 1.0, img.h as f64 - 1.0);
    let x0 = xf.clamp(0.0, max_x) as usize;
    let y0 = yf.clamp(0.0, max_y) as usize;
    let x1 = (xf + 1.0).clamp(0.0, max_x) as usize;
    let y1 = (yf + 1.0).clamp(0.0, max_y) as usize;
    let v00 = img.get(x0, y0);
    let v10 = img.get(x1, y0);
    let v01 = img.get(x0, y1);
    let v11 = img.get(x1, y1);
    let v0 = v00 * (1.0 - tx) + v10 * tx;
    let v1 = v01 * (1.0 - tx) + v11 * tx;
    v0 * (1.0 - ty) + v1 * ty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_interpolates_and_replicates_border() {
        let img = ImageF32::from_fn(3, 3, |x, y| (x + 10 * y) as f32);
        assert!((bilinear_clamped(&img, 1.5, 1.0) - 11.5).abs() < 1e-6);
        assert!((bilinear_clamped(&img, 0.0, 0.5) - 5.0).abs() < 1e-6);
        // Half the stencil is outside on the right.
        assert!((bilinear_clamped(&img, 2.5, 0.0) - 2.0).abs() < 1e-6);
        assert!((bilinear_clamped(&img, -5.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((bilinear_clamped(&img, 1.0, 7.5) - 21.0).abs() < 1e-6);
    }

    #[test]
    fn horizontal_line_band_matches_source_rows() {
        let img = ImageF32::from_fn(40, 30, |x, y| (x as f32) * 0.5 + y as f32);
        let line = Line::new(5.0, 15.0, 25.0, 15.0);
        let band = BilinearRectifier.rectify(&img, &line, 7).unwrap();
        assert_eq!(band.len(), 20);
        assert_eq!(band.width(), 7);
        assert_eq!(band.center_row(), 3);
        // Normal of a +x line points to +y.
        for r in 0..7 {
            for c in 0..20 {
                let expect = img.get(5 + c, 12 + r);
                assert!((band.image.get(c, r) - expect).abs() < 1e-5, "({c},{r})");
            }
        }
        assert_eq!(band.to_image(4.0, 5.0), [9.0, 17.0]);
    }

    #[test]
    fn diagonal_line_preserves_linear_intensity() {
        let img = ImageF32::from_fn(64, 64, |x, y| 0.25 * x as f32 + 0.5 * y as f32);
        let line = Line::new(10.0, 12.0, 40.0, 52.0);
        let band = BilinearRectifier.rectify(&img, &line, 5).unwrap();
        assert_eq!(band.len(), 50);
        for r in 0..5 {
            for c in 0..band.len() {
                let [x, y] = band.to_image(c as f64, r as f64);
                let expect = 0.25 * x + 0.5 * y;
                assert!((band.image.get(c, r) as f64 - expect).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn even_width_and_zero_length_are_rejected() {
        let img = ImageF32::new(10, 10);
        let r = BilinearRectifier.rectify(&img, &Line::new(0.0, 0.0, 5.0, 5.0), 4);
        assert!(matches!(r, Err(VcutError::InvalidParameter { .. })));
        let r = BilinearRectifier.rectify(&img, &Line::new(2.0, 2.0, 2.0, 2.0), 5);
        assert!(matches!(r, Err(VcutError::DegenerateLine { .. })));
    }
}
