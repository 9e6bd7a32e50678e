//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! All measurement stages operate on this type: raw inputs, rectified bands,
//! contrast images and their derivatives.
use super::traits::{ImageView, ImageViewMut};
use crate::error::{Result, VcutError};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every pixel set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != w * h {
            return Err(VcutError::invalid(
                "data",
                format!("expected {} samples for {w}x{h}, got {}", w * h, data.len()),
            ));
        }
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// `(width, height)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Mean of row `y`, accumulated in f64.
    pub fn row_mean(&self, y: usize) -> f64 {
        let row = self.row(y);
        if row.is_empty() {
            return 0.0;
        }
        row.iter().map(|&v| v as f64).sum::<f64>() / row.len() as f64
    }

    /// Mean over all pixels, accumulated in f64.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }

    /// Add `offset` to every pixel in place.
    pub fn offset(&mut self, offset: f32) {
        for v in &mut self.data {
            *v += offset;
        }
    }

    /// Apply `f` to every pixel in place.
    pub fn map_inplace(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Pixel-wise `self - other`. Shapes must match.
    pub fn subtract(&self, other: &ImageF32, what: &'static str) -> Result<ImageF32> {
        self.zip_map(other, what, |a, b| a - b)
    }

    /// Combine two equally-sized images pixel by pixel.
    pub fn zip_map(
        &self,
        other: &ImageF32,
        what: &'static str,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<ImageF32> {
        ensure_same_shape(self, other, what)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(ImageF32 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data,
        })
    }
}

/// Fail with [`VcutError::ShapeMismatch`] unless both images share dimensions.
pub fn ensure_same_shape(reference: &ImageF32, other: &ImageF32, what: &'static str) -> Result<()> {
    if reference.shape() != other.shape() {
        return Err(VcutError::ShapeMismatch {
            what,
            expected: reference.shape(),
            actual: other.shape(),
        });
    }
    Ok(())
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_rejects_mismatched_shapes() {
        let a = ImageF32::new(4, 3);
        let b = ImageF32::new(3, 4);
        let err = a.subtract(&b, "background").unwrap_err();
        assert!(matches!(err, VcutError::ShapeMismatch { what: "background", .. }));
    }

    #[test]
    fn row_mean_and_offset() {
        let mut img = ImageF32::from_fn(4, 2, |x, y| (x + 10 * y) as f32);
        assert!((img.row_mean(0) - 1.5).abs() < 1e-12);
        assert!((img.row_mean(1) - 11.5).abs() < 1e-12);
        img.offset(-1.5);
        assert!(img.row_mean(0).abs() < 1e-12);
    }
}
