//! Line primitives on 4-tuples `(x0, y0, x1, y1)` in image pixel coordinates.
//!
//! Lines are finite segments for clipping purposes and infinite carriers for
//! intersection purposes; each helper documents which view it takes.

mod intersect;
mod polygon;

pub use intersect::{intersect, point_is_between, segment_intersect, Intersection};
pub use polygon::{clip_line_to_polygon, point_in_polygon, Polygon};

use serde::{Deserialize, Serialize};

pub(crate) const EPS: f64 = 1e-12;

/// Directed line through `p0` and `p1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Line {
    pub p0: [f64; 2],
    pub p1: [f64; 2],
}

impl From<[f64; 4]> for Line {
    fn from(v: [f64; 4]) -> Self {
        Line::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Line> for [f64; 4] {
    fn from(l: Line) -> Self {
        [l.p0[0], l.p0[1], l.p1[0], l.p1[1]]
    }
}

impl Line {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            p0: [x0, y0],
            p1: [x1, y1],
        }
    }

    /// Unit-x line `y = m·x + n` starting at `x = 0`.
    pub fn from_slope_intercept(m: f64, n: f64) -> Self {
        Self::new(0.0, n, 1.0, m + n)
    }

    /// Un-normalized direction `(dx, dy)`.
    #[inline]
    pub fn direction(&self) -> [f64; 2] {
        [self.p1[0] - self.p0[0], self.p1[1] - self.p0[1]]
    }

    /// Normalized direction, `(0, 0)` for a zero-length line.
    #[inline]
    pub fn unit_direction(&self) -> [f64; 2] {
        let [dx, dy] = self.direction();
        let len = dx.hypot(dy);
        if len <= EPS {
            [0.0, 0.0]
        } else {
            [dx / len, dy / len]
        }
    }

    /// Unit normal `(-uy, ux)`; the direction rotated by +90°.
    #[inline]
    pub fn normal(&self) -> [f64; 2] {
        let [ux, uy] = self.unit_direction();
        [-uy, ux]
    }

    #[inline]
    pub fn length(&self) -> f64 {
        let [dx, dy] = self.direction();
        dx.hypot(dy)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length() <= EPS
    }

    /// Orientation `atan2(dy, dx)` in (-π, π].
    #[inline]
    pub fn angle(&self) -> f64 {
        let [dx, dy] = self.direction();
        dy.atan2(dx)
    }

    /// True for lines within 45° of the x axis.
    pub fn is_horizontal(&self) -> bool {
        let a = self.angle().abs();
        a < 0.25 * std::f64::consts::PI || a > 0.75 * std::f64::consts::PI
    }

    /// Point at `t` direction-lengths from `p0` (`t = 1` is `p1`).
    #[inline]
    pub fn point_at(&self, t: f64) -> [f64; 2] {
        let [dx, dy] = self.direction();
        [self.p0[0] + t * dx, self.p0[1] + t * dy]
    }

    /// Stretch (`factor > 1`) or compress the segment around the point at
    /// fractional position `anchor` (0 = start, 0.5 = middle, 1 = end).
    pub fn resize(&self, factor: f64, anchor: f64) -> Self {
        let [dx, dy] = self.direction();
        let [px, py] = self.point_at(anchor);
        let (dx, dy) = (dx * factor, dy * factor);
        let rest = 1.0 - anchor;
        Self::new(
            px - dx * anchor,
            py - dy * anchor,
            px + dx * rest,
            py + dy * rest,
        )
    }

    /// `y` where the carrier crosses the vertical `x`, `None` for vertical lines.
    pub fn y_at_x(&self, x: f64) -> Option<f64> {
        let [dx, dy] = self.direction();
        if dx == 0.0 {
            return None;
        }
        let m = dy / dx;
        Some(m * (x - self.p0[0]) + self.p0[1])
    }

    /// `x` where the carrier crosses the horizontal `y`, `None` for horizontal lines.
    pub fn x_at_y(&self, y: f64) -> Option<f64> {
        let [dx, dy] = self.direction();
        if dy == 0.0 {
            return None;
        }
        Some(dx / dy * (y - self.p0[1]) + self.p0[0])
    }
}

#[inline]
pub(crate) fn distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_direction_of_degenerate_line_is_zero() {
        let l = Line::new(3.0, 4.0, 3.0, 4.0);
        assert_eq!(l.unit_direction(), [0.0, 0.0]);
        assert!(l.is_degenerate());
    }

    #[test]
    fn normal_is_rotated_direction() {
        let l = Line::new(0.0, 0.0, 2.0, 0.0);
        assert_eq!(l.normal(), [-0.0, 1.0]);
    }

    #[test]
    fn resize_around_middle_keeps_center() {
        let l = Line::new(0.0, 0.0, 10.0, 0.0);
        let r = l.resize(1.2, 0.5);
        assert_relative_eq!(r.p0[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(r.p1[0], 11.0, epsilon = 1e-12);
        assert_relative_eq!(r.length(), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn resize_around_start_keeps_start() {
        let l = Line::new(1.0, 1.0, 4.0, 5.0);
        let r = l.resize(2.0, 0.0);
        assert_eq!(r.p0, l.p0);
        assert_relative_eq!(r.p1[0], 7.0, epsilon = 1e-12);
        assert_relative_eq!(r.p1[1], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn slope_intercept_line_evaluates() {
        let l = Line::from_slope_intercept(0.5, 2.0);
        assert_relative_eq!(l.y_at_x(4.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(l.x_at_y(4.0).unwrap(), 4.0, epsilon = 1e-12);
        assert!(Line::new(1.0, 0.0, 1.0, 5.0).y_at_x(2.0).is_none());
    }

    #[test]
    fn serde_uses_flat_array() {
        let l: Line = serde_json::from_str("[10, 20, 100, 25]").unwrap();
        assert_eq!(l, Line::new(10.0, 20.0, 100.0, 25.0));
        assert_eq!(serde_json::to_string(&l).unwrap(), "[10.0,20.0,100.0,25.0]");
    }
}
