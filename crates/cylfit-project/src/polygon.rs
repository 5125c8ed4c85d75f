//! Closed 2D polygons with signed winding.

use cylfit_math::Point2;

/// A 2D polygon (closed path).
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area of the polygon.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Winding direction: `1` for counter-clockwise (outer outline),
    /// `-1` for clockwise (hole), `0` for a degenerate polygon.
    pub fn winding(&self) -> i32 {
        let area = self.signed_area();
        if area > 0.0 {
            1
        } else if area < 0.0 {
            -1
        } else {
            0
        }
    }

    /// Reverse the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Area-weighted centroid of the polygon interior.
    ///
    /// Uses the standard polygon centroid formula, not the vertex average,
    /// so vertex density does not bias the result. Returns the vertex
    /// average as a fallback when the area is degenerate.
    pub fn area_centroid(&self) -> Point2 {
        let n = self.points.len();
        let area = self.signed_area();
        if n < 3 || area.abs() < f64::EPSILON {
            return self.vertex_average();
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let cross = self.points[i].x * self.points[j].y - self.points[j].x * self.points[i].y;
            cx += (self.points[i].x + self.points[j].x) * cross;
            cy += (self.points[i].y + self.points[j].y) * cross;
        }
        Point2::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    fn vertex_average(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::origin();
        }
        let sum = self
            .points
            .iter()
            .fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
        Point2::new(sum.0 / self.points.len() as f64, sum.1 / self.points.len() as f64)
    }
}

/// Drop hole polygons (negative winding), keeping only outer outlines.
pub fn filter_holes(polygons: Vec<Polygon>) -> Vec<Polygon> {
    polygons.into_iter().filter(|p| p.winding() == 1).collect()
}
