//! Point-in-polygon and clipping of lines to a closed polygon.

use super::{distance, segment_intersect, Line};

/// Closed polygon; the last vertex may repeat the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    /// Image bounding rectangle `(0,0)..(width,height)`, explicitly closed.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new(vec![
            [0.0, 0.0],
            [width, 0.0],
            [width, height],
            [0.0, height],
            [0.0, 0.0],
        ])
    }

    /// Polygon edges as segments, including the closing edge when missing.
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.vertices.len();
        let closed = n > 1 && self.vertices[0] == self.vertices[n - 1];
        let count = match n {
            0 | 1 => 0,
            _ if closed => n - 1,
            _ => n,
        };
        (0..count).map(move |i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            Line::new(a[0], a[1], b[0], b[1])
        })
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        point_in_polygon(x, y, self)
    }
}

/// Even-odd ray-casting test. Points exactly on an edge may fall either way.
pub fn point_in_polygon(x: f64, y: f64, polygon: &Polygon) -> bool {
    let pts = &polygon.vertices;
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let [mut p1x, mut p1y] = pts[0];
    for i in 1..=n {
        let [p2x, p2y] = pts[i % n];
        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
            // y strictly inside the edge's span rules out horizontal edges here.
            let x_cross = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
            if p1x == p2x || x <= x_cross {
                inside = !inside;
            }
        }
        p1x = p2x;
        p1y = p2y;
    }
    inside
}

/// Move endpoints lying outside `polygon` onto its boundary.
///
/// Each outside endpoint is replaced by the boundary crossing closest to it.
/// Returns `None` when an endpoint is outside and the segment never crosses
/// the boundary.
pub fn clip_line_to_polygon(line: &Line, polygon: &Polygon) -> Option<Line> {
    let p0_inside = polygon.contains(line.p0[0], line.p0[1]);
    let p1_inside = polygon.contains(line.p1[0], line.p1[1]);
    if p0_inside && p1_inside {
        return Some(*line);
    }

    let crossings: Vec<[f64; 2]> = polygon
        .edges()
        .filter_map(|edge| segment_intersect(line, &edge))
        .collect();
    let closest_to = |p: &[f64; 2]| {
        crossings
            .iter()
            .copied()
            .min_by(|a, b| distance(a, p).total_cmp(&distance(b, p)))
    };

    let mut clipped = *line;
    if !p0_inside {
        clipped.p0 = closest_to(&line.p0)?;
    }
    if !p1_inside {
        clipped.p1 = closest_to(&line.p1)?;
    }
    Some(clipped)
}
