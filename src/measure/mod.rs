//! V-cut measurement: from raw images and a rough line to a radial contrast curve.
//!
//! [`VcutMeasurer::measure`] runs these stages on a single call:
//! - Preprocess: shape checks and background subtraction.
//! - Clip the hint line to the image rectangle.
//! - Rectify masked (and unmasked) images into a band along the line.
//! - Baseline: subtract the outermost band row unless the mask is opaque.
//! - Contrast: masked band alone, or `(u − m) / (u + m)` with an unmasked band.
//! - Polarity: make the V gap bright (inferred unless configured).
//! - Edges: 5-tap row derivative, per-column extrema, sub-pixel refinement.
//!   With an unmasked band the edges are located on `masked / unmasked`,
//!   which stays linear in the masked intensity.
//! - Truncate to the columns where the gap is open, both edges lie inside
//!   the band and both derivative peaks are strong, then fit both edges.
//! - Apex and opening angle from the fitted edges.
//! - Radial profile along the midline in front of the apex, normalized to
//!   0..1 when no unmasked image is available.
//!
//! Typical usage:
//! ```no_run
//! use vcut_sharpness::prelude::*;
//!
//! # fn example(masked: ImageF32) -> vcut_sharpness::Result<()> {
//! let measurer = VcutMeasurer::new(MeasureParams::default());
//! let line = Line::new(420.0, 250.0, 40.0, 250.0);
//! let m = measurer.measure(&VcutInput::single(&masked), &line)?;
//! let fres = ResolutionCalibration::default().to_resolution_factor(&m.radii, &m.contrast, m.angle)?;
//! println!("angle {:.2}°, fres {fres:.3}", m.angle_degrees());
//! # Ok(())
//! # }
//! ```

pub mod contrast;
pub mod params;
pub mod result;

pub use contrast::{
    apply_polarity, infer_v_is_dark, normalize_plateaus, relative_contrast, RelativeContrast,
};
pub use params::MeasureParams;
pub use result::{EdgeFits, MeasurementSummary, VcutMeasurement};

use crate::angle::smallest_angle_between;
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::edges::{column_extrema, sobel5_rows, EdgeRows};
use crate::error::{Result, VcutError};
use crate::fit::robust_fit;
use crate::image::{ensure_same_shape, ImageF32};
use crate::interp::quadratic_column;
use crate::line::{clip_line_to_polygon, intersect, Intersection, Line, Polygon};
use crate::rectify::{BilinearRectifier, Rectifier};
use log::debug;
use std::time::Instant;

/// Minimum number of columns the edge fits need.
const MIN_FIT_COLUMNS: usize = 3;
/// Edge pairs opening less than this (radians) have no usable apex.
const MIN_OPENING_ANGLE: f64 = 1e-5;
/// Edges closer than this many rows to the band border are not fitted.
const EDGE_BORDER_ROWS: f64 = 2.0;
/// Quantile of the open columns' peak strengths taken as the reference.
const EDGE_STRENGTH_QUANTILE: f64 = 0.9;

/// Background to remove from the raw images before measuring.
#[derive(Clone, Copy, Debug)]
pub enum Background<'a> {
    /// Constant dark level.
    Level(f32),
    /// Dark or background frame of the same shape.
    Image(&'a ImageF32),
}

/// Images of one measurement. All images must share the masked image's shape.
#[derive(Clone, Copy, Debug)]
pub struct VcutInput<'a> {
    pub masked: &'a ImageF32,
    pub unmasked: Option<&'a ImageF32>,
    pub background: Option<Background<'a>>,
}

impl<'a> VcutInput<'a> {
    /// Masked image only; the contrast curve is normalized from its plateaus.
    pub fn single(masked: &'a ImageF32) -> Self {
        Self {
            masked,
            unmasked: None,
            background: None,
        }
    }

    pub fn with_unmasked(mut self, unmasked: &'a ImageF32) -> Self {
        self.unmasked = Some(unmasked);
        self
    }

    pub fn with_background(mut self, background: Background<'a>) -> Self {
        self.background = Some(background);
        self
    }
}

/// Stateless V-cut measurer.
#[derive(Clone, Debug)]
pub struct VcutMeasurer<R: Rectifier = BilinearRectifier> {
    params: MeasureParams,
    rectifier: R,
}

impl VcutMeasurer {
    pub fn new(params: MeasureParams) -> Self {
        Self::with_rectifier(params, BilinearRectifier)
    }
}

impl Default for VcutMeasurer {
    fn default() -> Self {
        Self::new(MeasureParams::default())
    }
}

impl<R: Rectifier> VcutMeasurer<R> {
    pub fn with_rectifier(params: MeasureParams, rectifier: R) -> Self {
        Self { params, rectifier }
    }

    pub fn params(&self) -> &MeasureParams {
        &self.params
    }

    /// Measure the V-cut crossed by `line` (from inside the gap to behind the apex).
    pub fn measure(&self, input: &VcutInput<'_>, line: &Line) -> Result<VcutMeasurement> {
        let total_start = Instant::now();
        let params = &self.params;
        params.validate()?;
        let mut timing = TimingBreakdown::default();

        let mut stage = Instant::now();
        let (masked, unmasked) = preprocess(input)?;
        let clipped = clip_to_image(line, masked.w, masked.h)?;
        debug!(
            "VcutMeasurer::measure {}x{} image, line {:?} -> clipped {:?}",
            masked.w,
            masked.h,
            <[f64; 4]>::from(*line),
            <[f64; 4]>::from(clipped)
        );
        stage = timing.lap("preprocess", stage);

        let mut masked_band = self
            .rectifier
            .rectify(&masked, &clipped, params.max_width)?;
        let mut unmasked_band = unmasked
            .as_ref()
            .map(|u| self.rectifier.rectify(u, &clipped, params.max_width))
            .transpose()?;
        stage = timing.lap("rectify", stage);

        if !params.mask_is_dark {
            let last = masked_band.width() - 1;
            let offset = masked_band.image.row_mean(last) as f32;
            masked_band.image.offset(-offset);
            if let Some(band) = unmasked_band.as_mut() {
                band.image.offset(-offset);
            }
            debug!("VcutMeasurer::measure baseline offset {offset:.5}");
        }

        let (mut contrast, mut transmission, degenerate_columns) = match &unmasked_band {
            Some(u) => {
                let rel = relative_contrast(&masked_band.image, &u.image)?;
                (rel.contrast, Some(rel.transmission), rel.degenerate_columns)
            }
            None => (masked_band.image.clone(), None, vec![false; masked_band.image.w]),
        };
        let v_is_dark = params
            .v_is_dark
            .unwrap_or_else(|| infer_v_is_dark(&contrast));
        apply_polarity(&mut contrast, v_is_dark);
        // Transmission decreases where the contrast increases; flip it so the
        // gap is bright in both.
        if let Some(t) = transmission.as_mut().filter(|_| v_is_dark) {
            t.map_inplace(|v| -v);
        }
        debug!(
            "VcutMeasurer::measure contrast {} (v_is_dark={v_is_dark}{})",
            if unmasked_band.is_some() { "relative" } else { "single-image" },
            if params.v_is_dark.is_none() { ", inferred" } else { "" }
        );
        stage = timing.lap("contrast", stage);

        let derivative = sobel5_rows(transmission.as_ref().unwrap_or(&contrast));
        let edge_rows = column_extrema(&derivative, params.subpixel_edges);
        let (start, end) = fit_range(
            &contrast,
            &derivative,
            &edge_rows,
            params.truncate_contrast,
            params.min_edge_strength,
        );
        debug!(
            "VcutMeasurer::measure fit columns {start}..{end} of {}",
            contrast.w
        );
        if let Some(c) = (start..end).find(|&c| degenerate_columns[c]) {
            return Err(VcutError::degenerate_contrast(format!(
                "unmasked level vanishes in fit column {c}"
            )));
        }
        if end - start < MIN_FIT_COLUMNS {
            return Err(VcutError::no_intersection(format!(
                "only {} column(s) above contrast {} for the edge fit",
                end - start,
                params.truncate_contrast
            )));
        }
        stage = timing.lap("edges", stage);

        let xs: Vec<f64> = (start..end).map(|c| c as f64).collect();
        let rising = robust_fit(&xs, &edge_rows.rising[start..end], &params.fit)?;
        let falling = robust_fit(&xs, &edge_rows.falling[start..end], &params.fit)?;
        let (rising_line, falling_line) = (rising.line(), falling.line());
        let angle = smallest_angle_between(&rising_line, &falling_line).abs();
        if angle < MIN_OPENING_ANGLE {
            return Err(VcutError::no_intersection(format!(
                "fitted edges are near-parallel ({angle:.3e} rad)"
            )));
        }
        let apex_band = match intersect(&rising_line, &falling_line) {
            Intersection::Point(p) => p,
            Intersection::Collinear(_) => {
                return Err(VcutError::no_intersection("fitted edges coincide"))
            }
            Intersection::None => {
                return Err(VcutError::no_intersection("fitted edges are parallel"))
            }
        };
        debug!(
            "VcutMeasurer::measure edges rising {:.5}x+{:.3} ({} inliers), falling {:.5}x+{:.3} ({} inliers), apex ({:.3},{:.3}), angle {:.4}°",
            rising.slope,
            rising.intercept,
            rising.inliers,
            falling.slope,
            falling.intercept,
            falling.inliers,
            apex_band[0],
            apex_band[1],
            angle.to_degrees()
        );
        stage = timing.lap("fit", stage);

        let n = contrast.w;
        let rising_rows: Vec<f64> = (0..n).map(|c| rising.eval(c as f64)).collect();
        let falling_rows: Vec<f64> = (0..n).map(|c| falling.eval(c as f64)).collect();
        let mid_rows: Vec<f64> = rising_rows
            .iter()
            .zip(&falling_rows)
            .map(|(r, f)| 0.5 * (r + f))
            .collect();
        let max_row = (contrast.h - 1) as f64;
        let mut radii = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        for c in 0..n {
            let mid = mid_rows[c];
            // Behind the apex the fitted edges have crossed.
            if falling_rows[c] <= rising_rows[c] || !(0.0..=max_row).contains(&mid) {
                continue;
            }
            values.push(quadratic_column(&contrast, c, mid));
            radii.push((c as f64 - apex_band[0]).hypot(mid - apex_band[1]));
        }
        if radii.is_empty() {
            return Err(VcutError::no_intersection(
                "no band column lies in front of the apex",
            ));
        }
        if unmasked_band.is_none() {
            let (low, high) = normalize_plateaus(&mut values, params.plateau_weight)?;
            debug!("VcutMeasurer::measure plateaus low {low:.5} high {high:.5}");
        }
        timing.push("profile", elapsed_ms(stage));
        timing.total_ms = elapsed_ms(total_start);
        debug!(
            "VcutMeasurer::measure {} profile samples, r in [{:.2}, {:.2}], total {:.2} ms",
            radii.len(),
            radii.iter().copied().fold(f64::INFINITY, f64::min),
            radii.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            timing.total_ms
        );

        let contrast_band = masked_band.with_image(contrast);
        let apex_image = contrast_band.to_image(apex_band[0], apex_band[1]);
        Ok(VcutMeasurement {
            radii,
            contrast: values,
            angle,
            apex_band,
            apex_image,
            edges: EdgeFits {
                rising,
                falling,
                rising_rows,
                falling_rows,
                mid_rows,
            },
            fit_columns: (start, end),
            v_is_dark,
            line: clipped,
            contrast_band,
            derivative,
            timing,
        })
    }
}

/// Convert, shape-check and background-correct the raw images.
fn preprocess(input: &VcutInput<'_>) -> Result<(ImageF32, Option<ImageF32>)> {
    let mut masked = input.masked.clone();
    let mut unmasked = input.unmasked.cloned();
    if let Some(u) = &unmasked {
        ensure_same_shape(&masked, u, "unmasked image")?;
    }
    match input.background {
        Some(Background::Level(level)) => {
            masked.offset(-level);
            if let Some(u) = unmasked.as_mut() {
                u.offset(-level);
            }
        }
        Some(Background::Image(bg)) => {
            masked = masked.subtract(bg, "background image")?;
            unmasked = unmasked
                .map(|u| u.subtract(bg, "background image"))
                .transpose()?;
        }
        None => {}
    }
    Ok((masked, unmasked))
}

/// Clip `line` to the `(0,0)..(w,h)` rectangle.
fn clip_to_image(line: &Line, w: usize, h: usize) -> Result<Line> {
    if line.is_degenerate() {
        return Err(VcutError::degenerate_line("hint line has zero length"));
    }
    let bounds = Polygon::rectangle(w as f64, h as f64);
    let clipped = clip_line_to_polygon(line, &bounds)
        .ok_or_else(|| VcutError::degenerate_line("hint line does not cross the image"))?;
    if clipped.is_degenerate() {
        return Err(VcutError::degenerate_line(
            "hint line collapses after clipping to the image",
        ));
    }
    Ok(clipped)
}

/// Columns `start..end` used for the edge fits.
///
/// A column is usable when its center-line contrast reaches `cutoff`, both
/// edges lie at least [`EDGE_BORDER_ROWS`] inside the band and the weaker of
/// its two derivative peaks reaches `min_strength` times the reference
/// strength of the open columns. Leading unusable columns are skipped; the
/// range ends at the next unusable column.
fn fit_range(
    contrast: &ImageF32,
    derivative: &ImageF32,
    edges: &EdgeRows,
    cutoff: f64,
    min_strength: f64,
) -> (usize, usize) {
    let n = edges.len().min(contrast.w);
    if contrast.h == 0 {
        return (n, n);
    }
    let max_row = (contrast.h - 1) as f64;
    let center = edges.center();
    let row_at = |r: f64| r.round().clamp(0.0, max_row) as usize;
    let inside = |r: f64| (EDGE_BORDER_ROWS..=max_row - EDGE_BORDER_ROWS).contains(&r);
    let open = |c: usize| {
        contrast.get(c, row_at(center[c])) as f64 >= cutoff
            && inside(edges.rising[c])
            && inside(edges.falling[c])
    };
    let strength = |c: usize| {
        let rise = derivative.get(c, row_at(edges.rising[c])) as f64;
        let fall = -derivative.get(c, row_at(edges.falling[c])) as f64;
        rise.min(fall)
    };

    let mut strengths: Vec<f64> = (0..n).filter(|&c| open(c)).map(strength).collect();
    if strengths.is_empty() {
        return (n, n);
    }
    strengths.sort_by(|a, b| a.total_cmp(b));
    let q = (EDGE_STRENGTH_QUANTILE * (strengths.len() - 1) as f64).round() as usize;
    let floor = min_strength * strengths[q];
    debug!("fit_range: reference peak strength {:.4e}", strengths[q]);

    let usable = |c: usize| open(c) && strength(c) >= floor;
    let start = (0..n).find(|&c| usable(c)).unwrap_or(n);
    let end = (start..n).find(|&c| !usable(c)).unwrap_or(n);
    (start, end)
}
