use crate::calibration::CalibrationCoeffs;
use crate::interp::linspace;
use crate::measure::MeasureParams;
use crate::synthetic::VcutPattern;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of `vcut_validate`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ValidateToolConfig {
    pub std: StdSweep,
    /// Synthetic measurements per std value.
    pub repetitions: usize,
    pub seed: u64,
    /// Report `angle · r50` instead of the recovered std (input for refitting
    /// the correction constants).
    pub uncorrected: bool,
    /// Measure the masked image alone instead of the masked/unmasked pair.
    pub single_image: bool,
    /// Template for the generated targets; `std` and `seed` are overridden.
    pub pattern: VcutPattern,
    pub params: MeasureParams,
    pub calibration: CalibrationCoeffs,
    pub output_json: Option<PathBuf>,
}

impl Default for ValidateToolConfig {
    fn default() -> Self {
        Self {
            std: StdSweep::default(),
            repetitions: 3,
            seed: 0,
            uncorrected: false,
            single_image: false,
            pattern: VcutPattern::default(),
            params: MeasureParams::default(),
            calibration: CalibrationCoeffs::default(),
            output_json: None,
        }
    }
}

/// Evenly spaced blur values `start..=stop`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StdSweep {
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
}

impl Default for StdSweep {
    fn default() -> Self {
        Self {
            start: 0.5,
            stop: 5.0,
            steps: 30,
        }
    }
}

impl StdSweep {
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.steps)
    }
}

pub fn load_config(path: &Path) -> Result<ValidateToolConfig, String> {
    super::load_json(path)
}
