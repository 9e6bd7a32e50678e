//! Carrier and segment intersection.

use super::{distance, Line};
use nalgebra::{Matrix2, Vector2};

/// Absolute and relative tolerances for treating the 2×2 system as singular.
const PARALLEL_ATOL: f64 = 1e-8;
const PARALLEL_RTOL: f64 = 1e-5;
/// Tolerance of the triangle-inequality "between endpoints" test.
const BETWEEN_TOL: f64 = 1e-6;

/// Outcome of intersecting two infinite carriers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    /// Unique crossing point.
    Point([f64; 2]),
    /// Collinear carriers; the point is an arbitrary one on the first line.
    Collinear([f64; 2]),
    /// Parallel, non-collinear carriers.
    None,
}

impl Intersection {
    pub fn point(self) -> Option<[f64; 2]> {
        match self {
            Intersection::Point(p) | Intersection::Collinear(p) => Some(p),
            Intersection::None => None,
        }
    }
}

#[inline]
fn near(a: f64, b: f64) -> bool {
    (a - b).abs() < PARALLEL_ATOL + PARALLEL_RTOL * b.abs()
}

/// Intersect the carriers of `a` and `b`.
///
/// Solves `p0_a + t·d_a = p0_b + s·d_b`. When the determinant vanishes the
/// lines are parallel: an axis-aligned `b` is resolved by substitution, any
/// other pair by comparing the two ratios that must agree for collinear
/// carriers.
pub fn intersect(a: &Line, b: &Line) -> Intersection {
    let [x1, y1] = a.p0;
    let [x2, y2] = a.p1;
    let [u1, v1] = b.p0;
    let [u2, v2] = b.p1;

    let m = Matrix2::new(x2 - x1, u1 - u2, y2 - y1, v1 - v2);
    let rhs = Vector2::new(u1 - x1, v1 - y1);
    let det = m.determinant();
    let scale = a.length() * b.length();

    if det.abs() >= PARALLEL_ATOL + PARALLEL_RTOL * scale {
        let t = (rhs[0] * m[(1, 1)] - m[(0, 1)] * rhs[1]) / det;
        return Intersection::Point(a.point_at(t));
    }

    let (bx, dy) = (m[(0, 1)], m[(1, 1)]);
    let (e, f) = (rhs[0], rhs[1]);
    if bx == 0.0 {
        // `b` is vertical at x = u1.
        return match a.y_at_x(u1) {
            Some(y) => Intersection::Point([u1, y]),
            None if x1 == u1 => Intersection::Collinear(a.p0),
            None => Intersection::None,
        };
    }
    if dy == 0.0 {
        // `b` is horizontal at y = v1.
        return match a.x_at_y(v1) {
            Some(x) => Intersection::Point([x, v1]),
            None if y1 == v1 => Intersection::Collinear(a.p0),
            None => Intersection::None,
        };
    }
    if near(e / bx, f / dy) {
        Intersection::Collinear(a.p0)
    } else {
        Intersection::None
    }
}

/// Whether `p` lies on the segment `start..end` within a small tolerance.
pub fn point_is_between(start: &[f64; 2], end: &[f64; 2], p: &[f64; 2]) -> bool {
    distance(start, p) + distance(p, end) - distance(start, end) < BETWEEN_TOL
}

/// Intersection of two finite segments.
pub fn segment_intersect(a: &Line, b: &Line) -> Option<[f64; 2]> {
    let p = intersect(a, b).point()?;
    (point_is_between(&a.p0, &a.p1, &p) && point_is_between(&b.p0, &b.p1, &p)).then_some(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crossing_lines_meet_at_known_point() {
        // Both pass through (3, 7).
        let a = Line::new(0.0, 1.0, 1.0, 3.0);
        let b = Line::new(0.0, 10.0, 6.0, 4.0);
        let p = intersect(&a, &b).point().expect("lines cross");
        assert_relative_eq!(p[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 7.0, epsilon = 1e-9);
    }

    #[test]
    fn strictly_parallel_lines_do_not_intersect() {
        let a = Line::new(0.0, 0.0, 4.0, 1.0);
        let b = Line::new(0.0, 2.0, 8.0, 4.0);
        assert_eq!(intersect(&a, &b), Intersection::None);
    }

    #[test]
    fn parallel_lines_never_yield_the_origin() {
        let a = Line::new(5.0, 5.0, 6.0, 7.0);
        let b = Line::new(9.0, 5.0, 10.0, 7.0);
        assert_eq!(intersect(&a, &b).point(), None);
    }

    #[test]
    fn collinear_lines_return_point_on_first() {
        let a = Line::new(0.0, 0.0, 1.0, 1.0);
        let b = Line::new(2.0, 2.0, 5.0, 5.0);
        assert_eq!(intersect(&a, &b), Intersection::Collinear([0.0, 0.0]));
    }

    #[test]
    fn vertical_and_horizontal_parallels() {
        let a = Line::new(1.0, 0.0, 1.0, 5.0);
        let b = Line::new(3.0, 0.0, 3.0, 2.0);
        assert_eq!(intersect(&a, &b), Intersection::None);
        let c = Line::new(1.0, 9.0, 1.0, 10.0);
        assert_eq!(intersect(&a, &c), Intersection::Collinear([1.0, 0.0]));
        let h0 = Line::new(0.0, 2.0, 5.0, 2.0);
        let h1 = Line::new(0.0, 4.0, 1.0, 4.0);
        assert_eq!(intersect(&h0, &h1), Intersection::None);
    }

    #[test]
    fn segment_intersection_respects_extent() {
        let a = Line::new(0.0, 0.0, 10.0, 0.0);
        let b = Line::new(5.0, -1.0, 5.0, 1.0);
        let p = segment_intersect(&a, &b).expect("segments cross");
        assert_relative_eq!(p[0], 5.0, epsilon = 1e-12);
        let short = Line::new(5.0, 1.0, 5.0, 3.0);
        assert!(segment_intersect(&a, &short).is_none());
    }
}
