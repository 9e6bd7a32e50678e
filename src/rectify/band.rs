//! Straightened band of pixels following a line.
use crate::image::ImageF32;

/// Samples of an image resampled along a line.
///
/// Columns run along the line (column 0 at its start), rows run along the
/// unit normal `(-uy, ux)`, with the line itself on the center row.
#[derive(Clone, Debug, PartialEq)]
pub struct RectifiedBand {
    /// `len()` columns × `width()` rows.
    pub image: ImageF32,
    /// Image position of column 0 on the center row.
    pub origin: [f64; 2],
    /// Unit step in image coordinates per column.
    pub direction: [f64; 2],
    /// Unit step in image coordinates per row.
    pub normal: [f64; 2],
}

impl RectifiedBand {
    /// Number of columns (samples along the line).
    #[inline]
    pub fn len(&self) -> usize {
        self.image.w
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image.w == 0
    }

    /// Number of rows (perpendicular samples, always odd).
    #[inline]
    pub fn width(&self) -> usize {
        self.image.h
    }

    #[inline]
    pub fn center_row(&self) -> usize {
        self.image.h / 2
    }

    /// Map a (fractional) band position back to image coordinates.
    pub fn to_image(&self, col: f64, row: f64) -> [f64; 2] {
        let off = row - self.center_row() as f64;
        [
            self.origin[0] + col * self.direction[0] + off * self.normal[0],
            self.origin[1] + col * self.direction[1] + off * self.normal[1],
        ]
    }

    /// Same sampling frame, different pixel content.
    pub fn with_image(&self, image: ImageF32) -> Self {
        debug_assert_eq!(image.shape(), self.image.shape());
        Self {
            image,
            origin: self.origin,
            direction: self.direction,
            normal: self.normal,
        }
    }
}
