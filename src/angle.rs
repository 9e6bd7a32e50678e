//! Angle utilities for line pairs.

use crate::line::Line;

/// Unsigned angle between two 2D vectors in radians, in [0, π].
/// Zero-length vectors are treated as having unit length to avoid NaNs.
#[inline]
pub fn angle_between(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dot = a[0] * b[0] + a[1] * b[1];
    let na = a[0].hypot(a[1]).max(1e-12);
    let nb = b[0].hypot(b[1]).max(1e-12);
    (dot / (na * nb)).clamp(-1.0, 1.0).acos()
}

/// Smallest angle between the directions of two lines, signed.
///
/// The magnitude comes from the clamped normalized dot product; the sign is
/// that of the y component of `b`'s direction, which disambiguates the two
/// mirror orientations of `b` relative to `a`.
pub fn smallest_angle_between(a: &Line, b: &Line) -> f64 {
    let da = a.direction();
    let db = b.direction();
    angle_between(&da, &db).copysign(db[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn angle_between_basic() {
        let a = [1.0, 0.0];
        assert!(approx_eq(angle_between(&a, &[1.0, 0.0]), 0.0));
        assert!(approx_eq(angle_between(&a, &[-1.0, 0.0]), PI));
        assert!(approx_eq(angle_between(&a, &[0.0, 1.0]), FRAC_PI_2));
    }

    #[test]
    fn smallest_angle_sign_follows_second_line() {
        let a = Line::new(0.0, 0.0, 1.0, 0.0);
        let up = Line::new(0.0, 0.0, 1.0, 1.0);
        let down = Line::new(0.0, 0.0, 1.0, -1.0);
        assert!(approx_eq(smallest_angle_between(&a, &up), FRAC_PI_4));
        assert!(approx_eq(smallest_angle_between(&a, &down), -FRAC_PI_4));
    }
}
