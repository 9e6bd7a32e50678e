use crate::calibration::CalibrationCoeffs;
use crate::line::Line;
use crate::measure::MeasureParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of `vcut_measure`.
///
/// ```json
/// {
///   "masked": "masked.png",
///   "unmasked": "unmasked.png",
///   "line": [250, 250, 250, 490],
///   "params": { "max_width": 101 },
///   "output": { "report_json": "out/report.json" }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct MeasureToolConfig {
    pub masked: PathBuf,
    #[serde(default)]
    pub unmasked: Option<PathBuf>,
    #[serde(default)]
    pub background: Option<BackgroundConfig>,
    /// Rough line from inside the gap to behind the apex, `[x0, y0, x1, y1]`.
    pub line: Line,
    /// Multiplies every loaded intensity. Unset: 1 / max of the brightest
    /// reference (unmasked image if given, else masked).
    #[serde(default)]
    pub intensity_scale: Option<f32>,
    #[serde(default)]
    pub params: MeasureParams,
    #[serde(default)]
    pub calibration: CalibrationCoeffs,
    #[serde(default)]
    pub output: MeasureOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BackgroundConfig {
    /// Constant dark level in raw intensity units.
    Level(f32),
    /// Background / dark-current image.
    Image(PathBuf),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeasureOutputConfig {
    /// Measurement summary with resolution factor and equivalent std.
    pub report_json: Option<PathBuf>,
    /// Rectified contrast band as PNG.
    pub contrast_image: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<MeasureToolConfig, String> {
    super::load_json(path)
}
