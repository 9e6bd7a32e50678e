#![doc = include_str!("../README.md")]

// Measurement pipeline and calibration
pub mod calibration;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod line;
pub mod measure;

// Building blocks, public for tools and experiments.
pub mod angle;
pub mod config;
pub mod edges;
pub mod fit;
pub mod interp;
pub mod rectify;
pub mod synthetic;

// --- High-level re-exports -------------------------------------------------

pub use crate::calibration::{std_to_psf, CalibrationCoeffs, ResolutionCalibration};
pub use crate::error::{Result, VcutError};
pub use crate::measure::{MeasureParams, VcutInput, VcutMeasurement, VcutMeasurer};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use vcut_sharpness::prelude::*;
///
/// # fn main() -> Result<()> {
/// let target = VcutPattern::with_std(1.5).generate()?;
/// let input = VcutInput::single(&target.masked).with_unmasked(&target.unmasked);
/// let m = VcutMeasurer::default().measure(&input, &target.line)?;
///
/// let cal = ResolutionCalibration::default();
/// let fres = cal.to_resolution_factor(&m.radii, &m.contrast, m.angle)?;
/// println!("angle={:.2}° std≈{:.3}", m.angle_degrees(), cal.resolution_factor_to_std(fres)?);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::calibration::{std_to_psf, CalibrationCoeffs, ResolutionCalibration};
    pub use crate::error::Result;
    pub use crate::image::ImageF32;
    pub use crate::line::Line;
    pub use crate::measure::{Background, MeasureParams, VcutInput, VcutMeasurement, VcutMeasurer};
    pub use crate::synthetic::VcutPattern;
}
