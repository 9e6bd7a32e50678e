//! Synthetic V-cut targets with known blur, opening angle and orientation.

use crate::calibration::{convolve_psf, std_to_psf, Psf, DEFAULT_PSF_K};
use crate::error::{Result, VcutError};
use crate::image::ImageF32;
use crate::line::Line;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::coverage;

/// Default range of random opening angles, degrees.
pub const DEFAULT_ANGLE_RANGE_DEG: (f64, f64) = (3.0, 6.0);

/// Recipe for a synthetic V-cut image pair.
///
/// The wedge (value 1 on 0) opens from the image center along the bisector
/// `(sin φ, cos φ)` in `(x, y)`. Unset angles are drawn from the seeded RNG.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcutPattern {
    /// Gaussian blur; required unless a PSF is passed to [`VcutPattern::generate_with_psf`].
    pub std: Option<f64>,
    /// Opening angle in radians.
    pub angle: Option<f64>,
    /// Bisector orientation in radians.
    pub phi: Option<f64>,
    /// Square image size in pixels.
    pub size: usize,
    /// Signal-to-noise ratio of the additive uniform noise; `None` disables noise.
    pub snr: Option<f64>,
    pub seed: u64,
}

impl Default for VcutPattern {
    fn default() -> Self {
        Self {
            std: None,
            angle: None,
            phi: None,
            size: 501,
            snr: Some(30.0),
            seed: 0,
        }
    }
}

/// Generated image pair with its ground truth.
#[derive(Clone, Debug)]
pub struct VcutTarget {
    pub masked: ImageF32,
    pub unmasked: ImageF32,
    /// Hint line from behind the apex into the gap.
    pub line: Line,
    pub apex: [f64; 2],
    pub angle: f64,
    pub phi: f64,
}

impl VcutPattern {
    pub fn with_std(std: f64) -> Self {
        Self {
            std: Some(std),
            ..Default::default()
        }
    }

    /// Blur with a Gaussian PSF built from `std`.
    pub fn generate(&self) -> Result<VcutTarget> {
        let std = self
            .std
            .ok_or_else(|| VcutError::invalid("std", "required when no PSF is given"))?;
        let psf = std_to_psf(std, DEFAULT_PSF_K, None)?;
        self.generate_with_psf(&psf)
    }

    pub fn generate_with_psf(&self, psf: &Psf) -> Result<VcutTarget> {
        if self.size < 3 {
            return Err(VcutError::invalid("size", format!("{} < 3", self.size)));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let angle = match self.angle {
            Some(a) => a,
            None => {
                let (lo, hi) = DEFAULT_ANGLE_RANGE_DEG;
                rng.gen_range(lo.to_radians()..hi.to_radians())
            }
        };
        if !(angle > 0.0 && angle < std::f64::consts::PI) {
            return Err(VcutError::invalid("angle", format!("{angle} rad")));
        }
        let phi = self
            .phi
            .unwrap_or_else(|| rng.gen::<f64>() * std::f64::consts::TAU);

        let c = self.size as f64 / 2.0;
        let apex = [c, c];
        let bisector = [phi.sin(), phi.cos()];
        let wedge = vcut_wedge(self.size, apex, bisector, angle);
        let mut masked = convolve_psf(&wedge, psf);
        let mut unmasked = ImageF32::filled(self.size, self.size, 1.0);

        if let Some(snr) = self.snr {
            if !(snr > 0.0) {
                return Err(VcutError::invalid("snr", format!("{snr} must be positive")));
            }
            let rel_noise = (1.0 / snr) as f32;
            for v in masked.data.iter_mut() {
                *v += rng.gen::<f32>() * rel_noise;
            }
            for v in unmasked.data.iter_mut() {
                *v += rng.gen::<f32>() * rel_noise;
            }
        }

        let half = 0.5 * self.size as f64;
        let line = Line::new(c, c, c + bisector[0] * half, c + bisector[1] * half).resize(1.2, 0.5);
        log::debug!(
            "VcutPattern: size {}, angle {:.3}°, phi {:.3}°, psf {}x{}",
            self.size,
            angle.to_degrees(),
            phi.to_degrees(),
            psf.size,
            psf.size
        );
        Ok(VcutTarget {
            masked,
            unmasked,
            line,
            apex,
            angle,
            phi,
        })
    }
}

/// Anti-aliased wedge of value 1 on 0 with the given apex, bisector and opening.
pub fn vcut_wedge(size: usize, apex: [f64; 2], bisector: [f64; 2], angle: f64) -> ImageF32 {
    let tan_half = (0.5 * angle).tan();
    ImageF32::from_fn(size, size, |x, y| {
        coverage(x, y, |px, py| {
            let (dx, dy) = (px - apex[0], py - apex[1]);
            let along = dx * bisector[0] + dy * bisector[1];
            let across = dx * bisector[1] - dy * bisector[0];
            along > 0.0 && across.abs() <= tan_half * along
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedge_covers_expected_region() {
        // Bisector along +x (phi = 90°).
        let img = vcut_wedge(41, [10.0, 20.0], [1.0, 0.0], 20f64.to_radians());
        assert_eq!(img.get(30, 20), 1.0);
        assert_eq!(img.get(5, 20), 0.0);
        assert_eq!(img.get(30, 5), 0.0);
        // Edge pixels are partially covered.
        let edge_y = 20.0 + 25.0 * 10f64.to_radians().tan();
        let v = img.get(35, edge_y.round() as usize);
        assert!(v > 0.0 && v < 1.0, "edge coverage {v}");
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let pattern = VcutPattern {
            std: Some(1.0),
            size: 61,
            seed: 7,
            ..Default::default()
        };
        let a = pattern.generate().unwrap();
        let b = pattern.generate().unwrap();
        assert_eq!(a.masked, b.masked);
        assert_eq!(a.angle, b.angle);
        assert!(a.angle >= 3f64.to_radians() && a.angle < 6f64.to_radians());

        let c = VcutPattern { seed: 8, ..pattern }.generate().unwrap();
        assert_ne!(a.masked, c.masked);
    }

    #[test]
    fn hint_line_runs_from_behind_apex_into_gap() {
        let t = VcutPattern {
            std: Some(1.0),
            phi: Some(0.0),
            angle: Some(0.1),
            size: 101,
            snr: None,
            ..Default::default()
        }
        .generate()
        .unwrap();
        // Bisector (0, 1): the line is vertical, starting 10% of its length above the apex.
        assert!((t.line.p0[0] - 50.5).abs() < 1e-9);
        assert!((t.line.p0[1] - (50.5 - 5.05)).abs() < 1e-9);
        assert!((t.line.p1[1] - (50.5 + 55.55)).abs() < 1e-9);
        assert!(t.unmasked.data.iter().all(|&v| v == 1.0));
    }
}
