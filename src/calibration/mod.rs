//! Resolution factor: a scalar sharpness figure from a V-cut contrast curve,
//! and its mapping to and from an equivalent Gaussian blur.
//!
//! - `fres0 = angle · r50`, where `r50` is the distance from the apex at
//!   which the contrast reaches one half.
//! - An empirical power-law correction maps `fres0` to the reported factor.
//! - `std ↔ fres` uses a fitted relation: `k·std` above one pixel of blur and
//!   `max(1, m·ln(n·std) + o·std + p)` below. The inverse is found numerically
//!   on a tabulated forward curve.
//!
//! All constants live in [`CalibrationCoeffs`], injected at construction.

pub mod psf;

pub use psf::{convolve_psf, std_to_psf, Psf, DEFAULT_PSF_K, MIN_PSF_SIZE};

use crate::error::{Result, VcutError};
use crate::interp::{find_crossing, linspace};
use serde::{Deserialize, Serialize};

/// Contrast level defining the characteristic radius.
pub const HALF_CONTRAST: f64 = 0.5;

/// Calibration constants produced by the offline fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationCoeffs {
    /// Bumped whenever the constants are refitted.
    pub version: u32,
    /// `[a, b, c, d]`: `f^a·b` below `correction_switch`, `f^c·d` above.
    pub correction: [f64; 4],
    pub correction_switch: f64,
    /// `fres = k·std` for `std > 1`.
    pub linear_slope: f64,
    /// `[m, n, o, p]` of `m·ln(n·std) + o·std + p` for `std ≤ 1`.
    pub log_linear: [f64; 4],
    /// Tabulation range of the forward curve used for inversion.
    pub std_min: f64,
    pub std_max: f64,
    pub grid_samples: usize,
}

impl Default for CalibrationCoeffs {
    fn default() -> Self {
        Self {
            version: 1,
            correction: [1.98784598, 0.38044078, 0.91077515, 1.00170451],
            correction_switch: 2.2,
            linear_slope: 1.92675391,
            log_linear: [1.11308561, 0.73214517, 0.78312647, 1.42350311],
            std_min: 0.5,
            std_max: 10.0,
            grid_samples: 1000,
        }
    }
}

/// Forward and inverse resolution-factor transforms.
#[derive(Clone, Debug)]
pub struct ResolutionCalibration {
    coeffs: CalibrationCoeffs,
    std_grid: Vec<f64>,
    fres_table: Vec<f64>,
}

impl Default for ResolutionCalibration {
    fn default() -> Self {
        Self::from_valid(CalibrationCoeffs::default())
    }
}

impl ResolutionCalibration {
    pub fn new(coeffs: CalibrationCoeffs) -> Result<Self> {
        if !(coeffs.std_min > 0.0) || !(coeffs.std_max > coeffs.std_min) {
            return Err(VcutError::invalid(
                "std_min/std_max",
                format!("need 0 < {} < {}", coeffs.std_min, coeffs.std_max),
            ));
        }
        if coeffs.grid_samples < 2 {
            return Err(VcutError::invalid(
                "grid_samples",
                format!("{} < 2", coeffs.grid_samples),
            ));
        }
        Ok(Self::from_valid(coeffs))
    }

    fn from_valid(coeffs: CalibrationCoeffs) -> Self {
        let std_grid = linspace(coeffs.std_min, coeffs.std_max, coeffs.grid_samples);
        let fres_table = std_grid.iter().map(|&s| forward(&coeffs, s)).collect();
        Self {
            coeffs,
            std_grid,
            fres_table,
        }
    }

    pub fn coeffs(&self) -> &CalibrationCoeffs {
        &self.coeffs
    }

    /// `angle · r50` before the empirical correction.
    pub fn uncorrected_resolution_factor(
        &self,
        radii: &[f64],
        contrasts: &[f64],
        angle: f64,
    ) -> Result<f64> {
        let r50 = find_crossing(radii, contrasts, HALF_CONTRAST, 0, 0.0)?;
        log::debug!(
            "ResolutionCalibration r50 = {r50:.4} px, angle = {:.4}°",
            angle.to_degrees()
        );
        Ok(angle * r50)
    }

    /// Corrected resolution factor of a measured contrast curve.
    pub fn to_resolution_factor(&self, radii: &[f64], contrasts: &[f64], angle: f64) -> Result<f64> {
        let raw = self.uncorrected_resolution_factor(radii, contrasts, angle)?;
        Ok(self.correct(raw))
    }

    /// Apply the power-law correction to an uncorrected factor.
    pub fn correct(&self, raw: f64) -> f64 {
        let [a, b, c, d] = self.coeffs.correction;
        if raw < self.coeffs.correction_switch {
            raw.powf(a) * b
        } else {
            raw.powf(c) * d
        }
    }

    /// Resolution factor of a Gaussian blur with standard deviation `std`.
    pub fn std_to_resolution_factor(&self, std: f64) -> Result<f64> {
        if !(std > 0.0) || !std.is_finite() {
            return Err(VcutError::invalid("std", format!("{std} must be positive")));
        }
        Ok(forward(&self.coeffs, std))
    }

    /// Gaussian blur standard deviation equivalent to `fres`.
    ///
    /// Factors below 1 (sharper than the model covers) return the grid floor.
    pub fn resolution_factor_to_std(&self, fres: f64) -> Result<f64> {
        if fres.is_nan() {
            return Err(VcutError::invalid("fres", "NaN"));
        }
        if fres < 1.0 {
            return Ok(self.coeffs.std_min);
        }
        find_crossing(&self.std_grid, &self.fres_table, fres, 0, 0.0)
    }
}

fn forward(coeffs: &CalibrationCoeffs, std: f64) -> f64 {
    if std > 1.0 {
        return coeffs.linear_slope * std;
    }
    let [m, n, o, p] = coeffs.log_linear;
    (m * (n * std).ln() + o * std + p).max(1.0)
}
