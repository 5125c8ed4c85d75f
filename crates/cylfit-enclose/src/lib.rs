#![warn(missing_docs)]

//! Smallest enclosing circle over a finite 2D point set.
//!
//! Incremental construction: walk the points keeping the minimal circle of
//! the prefix; when a point falls outside the current circle, rebuild the
//! circle pinned through that point (one-pinned scan), and inside that scan
//! pinned through a second point (two-pinned scan). Expected linear time on
//! typical inputs, O(n²) worst case without shuffling.

use cylfit_math::{Point2, Vec2};

/// Relative slack applied to containment tests so that points sitting
/// exactly on the boundary are counted as inside.
const CONTAINS_EPSILON: f64 = 1.0 + 1e-12;

/// A circle in the projection plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point.
    pub center: Point2,
    /// Radius (non-negative).
    pub radius: f64,
}

impl Circle {
    /// The zero circle at the origin.
    pub fn zero() -> Self {
        Self {
            center: Point2::origin(),
            radius: 0.0,
        }
    }

    /// True if `p` lies inside or on the circle, within tolerance.
    pub fn contains(&self, p: &Point2) -> bool {
        (p - self.center).norm() <= self.radius * CONTAINS_EPSILON
    }
}

/// Compute the smallest circle enclosing every point of `points`.
///
/// Duplicates and collinear/degenerate configurations are permitted.
/// Edge cases: an empty slice yields the zero circle at the origin, a
/// single point a zero-radius circle at that point, two points the
/// diameter circle through them.
pub fn enclosing_circle(points: &[Point2]) -> Circle {
    let mut circle = Circle::zero();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            circle = Circle {
                center: *p,
                radius: 0.0,
            };
        } else if !circle.contains(p) {
            circle = circle_with_one_pinned(&points[..=i], p);
        }
    }
    circle
}

/// Minimal circle over `points` passing through the pinned point `p`.
fn circle_with_one_pinned(points: &[Point2], p: &Point2) -> Circle {
    let mut circle = Circle {
        center: *p,
        radius: 0.0,
    };
    for (i, q) in points.iter().enumerate() {
        if !circle.contains(q) {
            if circle.radius == 0.0 {
                circle = diameter_circle(p, q);
            } else {
                circle = circle_with_two_pinned(&points[..=i], p, q);
            }
        }
    }
    circle
}

/// Minimal circle over `points` passing through both pinned points.
fn circle_with_two_pinned(points: &[Point2], p: &Point2, q: &Point2) -> Circle {
    let base = diameter_circle(p, q);
    let mut left: Option<Circle> = None;
    let mut right: Option<Circle> = None;

    // Pick the smallest circumcircle on each side of the pq line.
    let pq = q - p;
    for r in points {
        if base.contains(r) {
            continue;
        }
        let cross = cross2(&pq, &(r - p));
        let Some(c) = circumcircle(p, q, r) else {
            continue;
        };
        let c_side = cross2(&pq, &(c.center - p));
        if cross > 0.0 && left.as_ref().map_or(true, |l| c_side > cross2(&pq, &(l.center - p))) {
            left = Some(c);
        } else if cross < 0.0
            && right.as_ref().map_or(true, |r2| c_side < cross2(&pq, &(r2.center - p)))
        {
            right = Some(c);
        }
    }

    match (left, right) {
        (None, None) => base,
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (Some(l), Some(r)) => {
            if l.radius <= r.radius {
                l
            } else {
                r
            }
        }
    }
}

/// Circle with `a` and `b` as diameter endpoints.
fn diameter_circle(a: &Point2, b: &Point2) -> Circle {
    let center = Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    // Radius covers both endpoints even under rounding.
    let radius = (a - center).norm().max((b - center).norm());
    Circle { center, radius }
}

/// Circumcircle through three points, `None` when they are collinear.
fn circumcircle(a: &Point2, b: &Point2, c: &Point2) -> Option<Circle> {
    // Translate towards the centroid for numerical stability.
    let ox = (a.x.min(b.x).min(c.x) + a.x.max(b.x).max(c.x)) / 2.0;
    let oy = (a.y.min(b.y).min(c.y) + a.y.max(b.y).max(c.y)) / 2.0;
    let (ax, ay) = (a.x - ox, a.y - oy);
    let (bx, by) = (b.x - ox, b.y - oy);
    let (cx, cy) = (c.x - ox, c.y - oy);
    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d == 0.0 {
        return None;
    }
    let x = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;
    let y = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;
    let center = Point2::new(ox + x, oy + y);
    let radius = (a - center)
        .norm()
        .max((b - center).norm())
        .max((c - center).norm());
    Some(Circle { center, radius })
}

fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}
