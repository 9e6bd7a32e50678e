//! Parameters controlling a V-cut measurement.
//!
//! Defaults suit targets imaged at a few pixels of blur with the line hint
//! running from inside the gap to behind the apex.

use crate::error::{Result, VcutError};
use crate::fit::RobustFitOptions;
use serde::{Deserialize, Serialize};

/// Default band width in pixels (odd, so a center row exists).
pub const DEFAULT_MAX_WIDTH: usize = 101;
/// Center-line contrast below which the V is considered closed.
pub const DEFAULT_TRUNCATE_CONTRAST: f64 = 0.22;
/// Fraction of the reference derivative peak an edge needs to be fitted.
pub const DEFAULT_MIN_EDGE_STRENGTH: f64 = 0.2;
/// Weight of the extremum when deriving plateau thresholds for normalization.
pub const DEFAULT_PLATEAU_WEIGHT: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureParams {
    /// Rows of the rectified band; must be odd.
    pub max_width: usize,
    /// The mask blocks all light. When false the outermost band row is
    /// taken as the zero-contrast level and subtracted.
    pub mask_is_dark: bool,
    /// Whether the V mask appears dark in the contrast image. `None` infers it.
    pub v_is_dark: Option<bool>,
    /// Center-line contrast below which columns do not take part in the edge fit.
    pub truncate_contrast: f64,
    /// Weaker derivative peak of a column, relative to the strong peaks of
    /// the open columns, below which the fit range ends. In (0, 1].
    pub min_edge_strength: f64,
    /// Plateau weight for single-image normalization, in (0, 1].
    pub plateau_weight: f64,
    /// Robust fit used for both V edges.
    pub fit: RobustFitOptions,
    /// Refine edge rows with a three-point parabola.
    pub subpixel_edges: bool,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            mask_is_dark: true,
            v_is_dark: None,
            truncate_contrast: DEFAULT_TRUNCATE_CONTRAST,
            min_edge_strength: DEFAULT_MIN_EDGE_STRENGTH,
            plateau_weight: DEFAULT_PLATEAU_WEIGHT,
            fit: RobustFitOptions::default(),
            subpixel_edges: true,
        }
    }
}

impl MeasureParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_width % 2 == 0 {
            return Err(VcutError::invalid(
                "max_width",
                format!("{} must be odd and positive", self.max_width),
            ));
        }
        if !self.truncate_contrast.is_finite() {
            return Err(VcutError::invalid("truncate_contrast", "must be finite"));
        }
        if !(self.min_edge_strength > 0.0 && self.min_edge_strength <= 1.0) {
            return Err(VcutError::invalid(
                "min_edge_strength",
                format!("{} is outside (0, 1]", self.min_edge_strength),
            ));
        }
        if !(self.plateau_weight > 0.0 && self.plateau_weight <= 1.0) {
            return Err(VcutError::invalid(
                "plateau_weight",
                format!("{} is outside (0, 1]", self.plateau_weight),
            ));
        }
        if self.fit.iterations == 0 || !(self.fit.n_std_devs > 0.0) {
            return Err(VcutError::invalid(
                "fit",
                "iterations must be ≥ 1 and n_std_devs > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: MeasureParams =
            serde_json::from_str(r#"{ "max_width": 51, "fit": { "iterations": 5 } }"#).unwrap();
        assert_eq!(p.max_width, 51);
        assert_eq!(p.fit.iterations, 5);
        assert_eq!(p.fit.n_std_devs, 2.0);
        assert!(p.mask_is_dark);
        assert_eq!(p.v_is_dark, None);
        assert_eq!(p.truncate_contrast, DEFAULT_TRUNCATE_CONTRAST);
        assert_eq!(p.min_edge_strength, DEFAULT_MIN_EDGE_STRENGTH);
        p.validate().unwrap();
    }

    #[test]
    fn even_width_is_invalid() {
        let p = MeasureParams {
            max_width: 100,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(VcutError::InvalidParameter { name: "max_width", .. })
        ));
    }

    #[test]
    fn edge_strength_outside_unit_interval_is_invalid() {
        for v in [0.0, 1.5, f64::NAN] {
            let p = MeasureParams {
                min_edge_strength: v,
                ..Default::default()
            };
            assert!(matches!(
                p.validate(),
                Err(VcutError::InvalidParameter {
                    name: "min_edge_strength",
                    ..
                })
            ));
        }
    }
}
