//! Boundary extraction: merge projected triangles into closed outlines.

use std::collections::HashMap;

use cylfit_math::Point2;

use crate::polygon::Polygon;
use crate::project::Triangle2;

/// Quantization applied to endpoint coordinates so that shared edges from
/// neighbouring triangles cancel exactly despite floating-point noise.
const QUANTUM: f64 = 1e6;

type Key = (i64, i64);

fn key(p: &Point2) -> Key {
    ((p.x * QUANTUM).round() as i64, (p.y * QUANTUM).round() as i64)
}

/// Extract closed polygon outlines from a set of projected triangles.
///
/// Interior edges are shared by two triangles with opposite direction and
/// cancel; the surviving directed edges are chained into closed loops.
/// Winding signs follow from the triangle orientation: outer outlines come
/// out counter-clockwise, holes clockwise.
pub fn outlines_from_triangles(triangles: &[Triangle2]) -> Vec<Polygon> {
    // Directed edge multiset keyed by quantized endpoints. An edge and its
    // reverse annihilate each other.
    let mut edges: HashMap<(Key, Key), u32> = HashMap::new();
    let mut positions: HashMap<Key, Point2> = HashMap::new();

    for tri in triangles {
        let mut corners = [tri.a, tri.b, tri.c];
        if tri.signed_area() < 0.0 {
            corners.swap(1, 2);
        }
        let keys = [key(&corners[0]), key(&corners[1]), key(&corners[2])];
        // Degenerate after quantization.
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }
        for (p, k) in corners.iter().zip(keys.iter()) {
            positions.entry(*k).or_insert(*p);
        }
        for i in 0..3 {
            let u = keys[i];
            let v = keys[(i + 1) % 3];
            if let Some(count) = edges.get_mut(&(v, u)) {
                *count -= 1;
                if *count == 0 {
                    edges.remove(&(v, u));
                }
            } else {
                *edges.entry((u, v)).or_insert(0) += 1;
            }
        }
    }

    // Chain the surviving boundary edges into loops.
    let mut successors: HashMap<Key, Vec<Key>> = HashMap::new();
    for (&(u, v), &count) in &edges {
        for _ in 0..count {
            successors.entry(u).or_default().push(v);
        }
    }

    let mut polygons = Vec::new();
    let mut starts: Vec<Key> = successors.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        loop {
            if successors.get(&start).map_or(true, |v| v.is_empty()) {
                break;
            }
            let mut loop_keys = vec![start];
            let mut current = start;
            loop {
                let Some(nexts) = successors.get_mut(&current) else {
                    break;
                };
                let Some(next) = nexts.pop() else {
                    break;
                };
                if next == start {
                    break;
                }
                loop_keys.push(next);
                current = next;
            }
            if loop_keys.len() >= 3 {
                let points = loop_keys.iter().map(|k| positions[k]).collect();
                polygons.push(Polygon::new(points));
            }
        }
    }

    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(ax: f64, ay: f64, bx: f64, by: f64, cx: f64, cy: f64) -> Triangle2 {
        Triangle2 {
            a: Point2::new(ax, ay),
            b: Point2::new(bx, by),
            c: Point2::new(cx, cy),
        }
    }

    #[test]
    fn test_single_triangle_outline() {
        let polys = outlines_from_triangles(&[tri(0.0, 0.0, 1.0, 0.0, 0.0, 1.0)]);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 3);
        assert_eq!(polys[0].winding(), 1);
    }

    #[test]
    fn test_two_triangles_merge_into_square() {
        let polys = outlines_from_triangles(&[
            tri(0.0, 0.0, 1.0, 0.0, 1.0, 1.0),
            tri(0.0, 0.0, 1.0, 1.0, 0.0, 1.0),
        ]);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
        assert!((polys[0].signed_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cw_input_triangles_are_normalized() {
        // Same square, triangles given clockwise.
        let polys = outlines_from_triangles(&[
            tri(0.0, 0.0, 1.0, 1.0, 1.0, 0.0),
            tri(0.0, 0.0, 0.0, 1.0, 1.0, 1.0),
        ]);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].winding(), 1);
    }

    #[test]
    fn test_square_with_hole() {
        // An annulus-like tiling: outer square ring around an inner square
        // hole, triangulated. Outer boundary is CCW, hole boundary CW.
        let outer = [
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (0.0, 3.0),
        ];
        let inner = [
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
        ];
        let mut tris = Vec::new();
        for i in 0..4 {
            let j = (i + 1) % 4;
            let (ox0, oy0) = outer[i];
            let (ox1, oy1) = outer[j];
            let (ix0, iy0) = inner[i];
            let (ix1, iy1) = inner[j];
            tris.push(tri(ox0, oy0, ox1, oy1, ix1, iy1));
            tris.push(tri(ox0, oy0, ix1, iy1, ix0, iy0));
        }
        let polys = outlines_from_triangles(&tris);
        assert_eq!(polys.len(), 2);
        let windings: Vec<i32> = polys.iter().map(|p| p.winding()).collect();
        assert!(windings.contains(&1));
        assert!(windings.contains(&-1));
        let outer_poly = polys.iter().find(|p| p.winding() == 1).unwrap();
        assert!((outer_poly.signed_area() - 9.0).abs() < 1e-9);
        let hole_poly = polys.iter().find(|p| p.winding() == -1).unwrap();
        assert!((hole_poly.signed_area() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_triangle_ignored() {
        let polys = outlines_from_triangles(&[tri(0.0, 0.0, 1.0, 0.0, 2.0, 0.0)]);
        assert!(polys.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(outlines_from_triangles(&[]).is_empty());
    }
}
