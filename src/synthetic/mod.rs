//! Synthetic test targets: V-cut image pairs and the Siemens star.
//!
//! Shapes are rasterized with 4×4 supersampling per pixel (coverage fraction),
//! so edges carry sub-pixel position information before any blur is applied.

mod star;
mod vcut;

pub use star::siemens_star;
pub use vcut::{vcut_wedge, VcutPattern, VcutTarget, DEFAULT_ANGLE_RANGE_DEG};

/// Subsamples per pixel along each axis.
const SUPERSAMPLE: usize = 4;

/// Fraction of the pixel centred on `(x, y)` for which `inside` holds.
fn coverage(x: usize, y: usize, inside: impl Fn(f64, f64) -> bool) -> f32 {
    let step = 1.0 / SUPERSAMPLE as f64;
    let mut hits = 0usize;
    for j in 0..SUPERSAMPLE {
        let py = y as f64 - 0.5 + (j as f64 + 0.5) * step;
        for i in 0..SUPERSAMPLE {
            let px = x as f64 - 0.5 + (i as f64 + 0.5) * step;
            if inside(px, py) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SUPERSAMPLE * SUPERSAMPLE) as f32
}
