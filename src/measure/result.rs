//! Measurement output and its JSON summary.

use crate::diagnostics::TimingBreakdown;
use crate::fit::LinearFit;
use crate::image::ImageF32;
use crate::line::Line;
use crate::rectify::RectifiedBand;
use serde::Serialize;

/// Fitted V edges in band coordinates (`row = slope·column + intercept`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeFits {
    /// Edge where contrast rises with the row index.
    pub rising: LinearFit,
    /// Edge where contrast falls with the row index.
    pub falling: LinearFit,
    /// Fitted rising-edge row for every band column.
    pub rising_rows: Vec<f64>,
    /// Fitted falling-edge row for every band column.
    pub falling_rows: Vec<f64>,
    /// Midline between both fitted edges for every band column.
    pub mid_rows: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct VcutMeasurement {
    /// Distance from the apex of each retained profile sample.
    pub radii: Vec<f64>,
    /// Contrast along the midline, normalized to 0..1 in single-image mode.
    pub contrast: Vec<f64>,
    /// Opening angle of the V (radians, unsigned).
    pub angle: f64,
    /// Apex as (column, row) in the band.
    pub apex_band: [f64; 2],
    /// Apex in source image coordinates.
    pub apex_image: [f64; 2],
    pub edges: EdgeFits,
    /// Columns used for the edge fits, `start..end`.
    pub fit_columns: (usize, usize),
    /// Resolved polarity of the V mask before inversion.
    pub v_is_dark: bool,
    /// Hint line after clipping to the image.
    pub line: Line,
    /// Contrast band (V gap bright) used for truncation and the profile.
    pub contrast_band: RectifiedBand,
    /// Row derivative the edges were located on (`contrast_band`, or the
    /// transmission `masked / unmasked` in pair mode).
    pub derivative: ImageF32,
    pub timing: TimingBreakdown,
}

impl VcutMeasurement {
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub fn summary(&self) -> MeasurementSummary {
        MeasurementSummary {
            angle_deg: self.angle_degrees(),
            apex: self.apex_image,
            apex_band: self.apex_band,
            line: self.line,
            fit_columns: [self.fit_columns.0, self.fit_columns.1],
            rising_inliers: self.edges.rising.inliers,
            falling_inliers: self.edges.falling.inliers,
            v_is_dark: self.v_is_dark,
            samples: self.radii.len(),
            radii: self.radii.clone(),
            contrast: self.contrast.clone(),
            timing: self.timing.clone(),
        }
    }
}

/// Serializable view of a [`VcutMeasurement`] without the image buffers.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSummary {
    pub angle_deg: f64,
    pub apex: [f64; 2],
    pub apex_band: [f64; 2],
    pub line: Line,
    pub fit_columns: [usize; 2],
    pub rising_inliers: usize,
    pub falling_inliers: usize,
    pub v_is_dark: bool,
    pub samples: usize,
    pub radii: Vec<f64>,
    pub contrast: Vec<f64>,
    pub timing: TimingBreakdown,
}
