//! Orthographic projection of triangle meshes onto the XY plane.

use cylfit_math::{Point2, Transform};
use cylfit_mesh::TriangleMesh;
use rayon::prelude::*;

/// A triangle in the projection plane.
#[derive(Debug, Clone, Copy)]
pub struct Triangle2 {
    /// First corner.
    pub a: Point2,
    /// Second corner.
    pub b: Point2,
    /// Third corner.
    pub c: Point2,
}

impl Triangle2 {
    /// Signed area (positive = counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        ((self.b.x - self.a.x) * (self.c.y - self.a.y)
            - (self.c.x - self.a.x) * (self.b.y - self.a.y))
            / 2.0
    }
}

/// Project `mesh` under `world` onto the XY plane, keeping only
/// front-facing triangles.
///
/// A closed surface projects every silhouette region twice, once from the
/// near side and once from the far side; filtering to faces whose
/// transformed normal has positive Z keeps each region once.
pub fn project_to_xy(mesh: &TriangleMesh, world: &Transform) -> Vec<Triangle2> {
    (0..mesh.num_triangles())
        .into_par_iter()
        .filter_map(|tri| {
            let normal = world.apply_normal(&mesh.face_normal(tri));
            if normal.z <= 0.0 {
                return None;
            }
            let [a, b, c] = mesh.triangle(tri);
            let a = world.apply_point(&a);
            let b = world.apply_point(&b);
            let c = world.apply_point(&c);
            Some(Triangle2 {
                a: Point2::new(a.x, a.y),
                b: Point2::new(b.x, b.y),
                c: Point2::new(c.x, c.y),
            })
        })
        .collect()
}

/// Project every vertex of `mesh` under `world` onto the XY plane.
///
/// No facing filter: this feeds the enclosing-circle solver, which wants
/// the full transformed point cloud.
pub fn project_vertices(mesh: &TriangleMesh, world: &Transform) -> Vec<Point2> {
    mesh.iter_vertices()
        .map(|p| {
            let p = world.apply_point(&p);
            Point2::new(p.x, p.y)
        })
        .collect()
}
