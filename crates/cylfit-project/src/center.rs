//! Area-weighted visual center of a projected polygon set.

use cylfit_math::Point2;

use crate::error::{ProjectError, Result};
use crate::polygon::Polygon;

/// The visual center of a polygon set and its maximum radial extent.
#[derive(Debug, Clone, Copy)]
pub struct VisualCenter {
    /// Area-weighted centroid of the outer outlines.
    pub center: Point2,
    /// Maximum distance from the center to any outline vertex.
    pub radius: f64,
}

/// Compute the visual center of hole-filtered outer outlines.
///
/// The center is the area-weighted centroid of the polygons, which tracks
/// the visual mass of asymmetric shapes better than the bounding-box
/// center. The radius is the largest distance from that center to any
/// vertex; mapping it onto the target cylinder radius makes the whole
/// outline fit.
pub fn visual_center(outlines: &[Polygon]) -> Result<VisualCenter> {
    if outlines.is_empty() {
        return Err(ProjectError::EmptyProjection);
    }

    let mut total_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for poly in outlines {
        let area = poly.signed_area();
        let centroid = poly.area_centroid();
        total_area += area;
        cx += centroid.x * area;
        cy += centroid.y * area;
    }
    if total_area.abs() < 1e-12 {
        return Err(ProjectError::ZeroArea);
    }
    let center = Point2::new(cx / total_area, cy / total_area);

    let mut max_dist_sq = 0.0f64;
    for poly in outlines {
        for p in &poly.points {
            max_dist_sq = max_dist_sq.max((p - center).norm_squared());
        }
    }
    let radius = max_dist_sq.sqrt();
    if radius < 1e-9 {
        return Err(ProjectError::ZeroExtent);
    }

    Ok(VisualCenter { center, radius })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(f64, f64)]) -> Polygon {
        Polygon::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    #[test]
    fn test_square_center() {
        let square = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let vc = visual_center(&[square]).unwrap();
        approx::assert_relative_eq!(vc.center.x, 1.0, epsilon = 1e-9);
        approx::assert_relative_eq!(vc.center.y, 1.0, epsilon = 1e-9);
        // Farthest vertex is a corner.
        approx::assert_relative_eq!(vc.radius, 2.0f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_l_shape_center_inside_footprint() {
        // L-shape: 2x2 square with the top-right 1x1 quadrant missing.
        let l = polygon(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let vc = visual_center(&[l.clone()]).unwrap();
        // Bounding-box center (1,1) sits on the notch corner; the visual
        // center is pulled into the filled part.
        assert!(vc.center.x < 1.0);
        assert!(vc.center.y < 1.0);
        // Known centroid of this L: (5/6, 5/6).
        assert!((vc.center.x - 5.0 / 6.0).abs() < 1e-9);
        assert!((vc.center.y - 5.0 / 6.0).abs() < 1e-9);
        // Inside the footprint: within the 2x2 bounds and not in the notch.
        assert!(vc.center.x > 0.0 && vc.center.y > 0.0);
        assert!(!(vc.center.x > 1.0 && vc.center.y > 1.0));
    }

    #[test]
    fn test_two_disjoint_squares_weighted() {
        // A big square and a small one: center pulled toward the big one.
        let big = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let small = polygon(&[(4.0, 0.0), (5.0, 0.0), (5.0, 1.0), (4.0, 1.0)]);
        let vc = visual_center(&[big, small]).unwrap();
        // Areas 4 and 1, centroids (1,1) and (4.5,0.5).
        assert!((vc.center.x - (4.0 * 1.0 + 1.0 * 4.5) / 5.0).abs() < 1e-9);
        assert!((vc.center.y - (4.0 * 1.0 + 1.0 * 0.5) / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_is_error() {
        let line = polygon(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(matches!(
            visual_center(&[line]),
            Err(ProjectError::ZeroArea)
        ));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(
            visual_center(&[]),
            Err(ProjectError::EmptyProjection)
        ));
    }
}
