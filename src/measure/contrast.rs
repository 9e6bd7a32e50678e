//! Contrast formation, polarity and plateau normalization.

use crate::error::{Result, VcutError};
use crate::image::ImageF32;

/// Absolute floor of the ratio guard for bands that are dark throughout.
const MIN_CONTRAST_SUM: f64 = 1e-12;
/// Unmasked levels or `u + m` sums below this fraction of the band's median
/// unmasked level leave the ratio undefined.
pub const MIN_RELATIVE_LEVEL: f64 = 0.05;

/// Ratio images of a masked/unmasked band pair.
#[derive(Clone, Debug)]
pub struct RelativeContrast {
    /// `(unmasked − masked) / (unmasked + masked)`; 1 where undefined.
    pub contrast: ImageF32,
    /// `masked / unmasked`, linear in the masked intensity; 0 where undefined.
    pub transmission: ImageF32,
    /// Columns holding at least one pixel where the ratio is undefined.
    pub degenerate_columns: Vec<bool>,
}

/// Relative contrast `(u − m) / (u + m)` and transmission `m / u` per pixel.
///
/// Pixels whose unmasked level or `u + m` falls below
/// [`MIN_RELATIVE_LEVEL`] times the median unmasked level are flagged per
/// column. A band without a single usable pixel is an error.
pub fn relative_contrast(masked: &ImageF32, unmasked: &ImageF32) -> Result<RelativeContrast> {
    crate::image::ensure_same_shape(masked, unmasked, "unmasked band")?;
    let (w, h) = masked.shape();
    let mut levels: Vec<f64> = unmasked.data.iter().map(|&u| (u as f64).abs()).collect();
    let level = median(&mut levels).unwrap_or(0.0);
    let tol = (MIN_RELATIVE_LEVEL * level).max(MIN_CONTRAST_SUM);

    let mut contrast = ImageF32::new(w, h);
    let mut transmission = ImageF32::new(w, h);
    let mut degenerate_columns = vec![false; w];
    let mut degenerate = 0usize;
    for y in 0..h {
        for x in 0..w {
            let m = masked.get(x, y) as f64;
            let u = unmasked.get(x, y) as f64;
            if u < tol || u + m < tol {
                contrast.set(x, y, 1.0);
                degenerate_columns[x] = true;
                degenerate += 1;
                continue;
            }
            contrast.set(x, y, ((u - m) / (u + m)) as f32);
            transmission.set(x, y, (m / u) as f32);
        }
    }
    if degenerate == w * h {
        return Err(VcutError::degenerate_contrast(format!(
            "unmasked band has no level above {tol:.3e} (median {level:.3e})"
        )));
    }
    if degenerate > 0 {
        log::debug!(
            "relative_contrast: {degenerate} pixel(s) in {} column(s) below {tol:.3e}",
            degenerate_columns.iter().filter(|&&d| d).count()
        );
    }
    Ok(RelativeContrast {
        contrast,
        transmission,
        degenerate_columns,
    })
}

/// Polarity heuristic: the V mask is dark when the band's center row (the
/// line, running through the gap) is brighter on average than its first row.
pub fn infer_v_is_dark(contrast: &ImageF32) -> bool {
    if contrast.h == 0 {
        return true;
    }
    contrast.row_mean(contrast.h / 2) > contrast.row_mean(0)
}

/// Make the V gap bright: invert (`1 − c`) unless the mask is already dark.
pub fn apply_polarity(contrast: &mut ImageF32, v_is_dark: bool) {
    if !v_is_dark {
        contrast.map_inplace(|c| 1.0 - c);
    }
}

/// Plateau levels `(low, high)` of a curve running between two levels.
///
/// Samples above `w·max − (1−w)·mean` form the high plateau and samples below
/// `w·min + (1−w)·mean` the low one; each level is the median of its samples.
pub fn plateau_levels(values: &[f64], weight: f64) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(VcutError::degenerate_contrast("empty contrast curve"));
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let rest = 1.0 - weight;
    let t_high = weight * max - rest * mean;
    let t_low = weight * min + rest * mean;

    let mut high: Vec<f64> = values.iter().copied().filter(|&v| v > t_high).collect();
    let mut low: Vec<f64> = values.iter().copied().filter(|&v| v < t_low).collect();
    let (Some(high), Some(low)) = (median(&mut high), median(&mut low)) else {
        return Err(VcutError::degenerate_contrast(format!(
            "empty plateau (thresholds low {t_low:.4}, high {t_high:.4})"
        )));
    };
    Ok((low, high))
}

/// Rescale `values` in place so the plateaus map to 0 and 1.
pub fn normalize_plateaus(values: &mut [f64], weight: f64) -> Result<(f64, f64)> {
    let (low, high) = plateau_levels(values, weight)?;
    let span = high - low;
    if !(span.abs() > f64::EPSILON * (high.abs() + low.abs()).max(1.0)) {
        return Err(VcutError::degenerate_contrast(format!(
            "plateaus collapse (low {low}, high {high})"
        )));
    }
    for v in values.iter_mut() {
        *v = (*v - low) / span;
    }
    Ok((low, high))
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    Some(if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    })
}
