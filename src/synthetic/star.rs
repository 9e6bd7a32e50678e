//! Siemens star test chart.

use crate::image::ImageF32;

use super::coverage;

/// `2n` alternating wedges around the image center; odd wedges are `high`.
///
/// Wedge `i` spans directions `(sin θ, cos θ)` with `θ ∈ [i·π/n, (i+1)·π/n)`.
pub fn siemens_star(size: usize, n: usize, high: f32, low: f32) -> ImageF32 {
    let n = n.max(1);
    let c = (size as f64 / 2.0).round();
    let sector = std::f64::consts::PI / n as f64;
    let mut img = ImageF32::from_fn(size, size, |x, y| {
        let frac = coverage(x, y, |px, py| {
            let theta = (px - c).atan2(py - c).rem_euclid(std::f64::consts::TAU);
            (theta / sector) as usize % 2 == 1
        });
        low + (high - low) * frac
    });
    let ci = c as usize;
    if ci < size {
        img.set(ci, ci, low);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_alternates_around_center() {
        let img = siemens_star(200, 8, 255.0, 0.0);
        // n = 8: sectors of 22.5°; θ measured from +y towards +x.
        let at = |deg: f64| {
            let t = deg.to_radians();
            let (x, y) = (100.0 + 80.0 * t.sin(), 100.0 + 80.0 * t.cos());
            img.get(x.round() as usize, y.round() as usize)
        };
        assert_eq!(at(11.25), 0.0);
        assert_eq!(at(33.75), 255.0);
        assert_eq!(at(56.25), 0.0);
        assert_eq!(at(78.75), 255.0);
        assert_eq!(img.get(100, 100), 0.0);
    }
}
