#![warn(missing_docs)]

//! Triangle mesh storage for the cylfit engine.
//!
//! Provides the flat-buffer [`TriangleMesh`] type, constructors for the
//! reference primitives used as fit proxies (unit cube, cylinder), and
//! bounding-box computation under an arbitrary affine transform.

use std::f64::consts::PI;

use cylfit_math::{Aabb3, Point3, Transform, Vec3};

/// A triangle mesh with flat vertex/index/normal buffers.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of per-face normals: `[nx0, ny0, nz0, ...]` (f32), one per triangle.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Vertex position at `index` as a double-precision point.
    pub fn vertex(&self, index: usize) -> Point3 {
        Point3::new(
            self.vertices[index * 3] as f64,
            self.vertices[index * 3 + 1] as f64,
            self.vertices[index * 3 + 2] as f64,
        )
    }

    /// The three corner points of triangle `tri`.
    pub fn triangle(&self, tri: usize) -> [Point3; 3] {
        [
            self.vertex(self.indices[tri * 3] as usize),
            self.vertex(self.indices[tri * 3 + 1] as usize),
            self.vertex(self.indices[tri * 3 + 2] as usize),
        ]
    }

    /// Stored face normal of triangle `tri`.
    pub fn face_normal(&self, tri: usize) -> Vec3 {
        Vec3::new(
            self.normals[tri * 3] as f64,
            self.normals[tri * 3 + 1] as f64,
            self.normals[tri * 3 + 2] as f64,
        )
    }

    /// Iterate over all vertex positions.
    pub fn iter_vertices(&self) -> impl Iterator<Item = Point3> + '_ {
        (0..self.num_vertices()).map(|i| self.vertex(i))
    }

    /// Axis-aligned bounding box of the mesh under `transform`.
    ///
    /// Returns `None` for an empty mesh.
    pub fn bounding_box(&self, transform: &Transform) -> Option<Aabb3> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut aabb = Aabb3::empty();
        for p in self.iter_vertices() {
            aabb.include_point(&transform.apply_point(&p));
        }
        Some(aabb)
    }

    fn push_triangle(&mut self, a: Point3, b: Point3, c: Point3) {
        let base = self.num_vertices() as u32;
        for p in [a, b, c] {
            self.vertices.push(p.x as f32);
            self.vertices.push(p.y as f32);
            self.vertices.push(p.z as f32);
        }
        self.indices.extend([base, base + 1, base + 2]);
        let n = (b - a).cross(&(c - a));
        let n = if n.norm() > 0.0 { n.normalize() } else { n };
        self.normals.push(n.x as f32);
        self.normals.push(n.y as f32);
        self.normals.push(n.z as f32);
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit cube centered at the origin (extent 1x1x1), CCW-wound outward faces.
///
/// This is the reference proxy the fit engine scales to the target cylinder's
/// bounding size.
pub fn make_unit_cube() -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let h = 0.5;
    let corners = |sx: f64, sy: f64, sz: f64| Point3::new(sx * h, sy * h, sz * h);

    // Each face as two triangles, wound so the normal points outward.
    let faces: [[Point3; 4]; 6] = [
        // +Z
        [
            corners(-1.0, -1.0, 1.0),
            corners(1.0, -1.0, 1.0),
            corners(1.0, 1.0, 1.0),
            corners(-1.0, 1.0, 1.0),
        ],
        // -Z
        [
            corners(-1.0, 1.0, -1.0),
            corners(1.0, 1.0, -1.0),
            corners(1.0, -1.0, -1.0),
            corners(-1.0, -1.0, -1.0),
        ],
        // +X
        [
            corners(1.0, -1.0, -1.0),
            corners(1.0, 1.0, -1.0),
            corners(1.0, 1.0, 1.0),
            corners(1.0, -1.0, 1.0),
        ],
        // -X
        [
            corners(-1.0, -1.0, 1.0),
            corners(-1.0, 1.0, 1.0),
            corners(-1.0, 1.0, -1.0),
            corners(-1.0, -1.0, -1.0),
        ],
        // +Y
        [
            corners(-1.0, 1.0, -1.0),
            corners(-1.0, 1.0, 1.0),
            corners(1.0, 1.0, 1.0),
            corners(1.0, 1.0, -1.0),
        ],
        // -Y
        [
            corners(-1.0, -1.0, -1.0),
            corners(1.0, -1.0, -1.0),
            corners(1.0, -1.0, 1.0),
            corners(-1.0, -1.0, 1.0),
        ],
    ];

    for quad in faces {
        mesh.push_triangle(quad[0], quad[1], quad[2]);
        mesh.push_triangle(quad[0], quad[2], quad[3]);
    }
    mesh
}

/// Cylinder along the Z axis, centered at the origin.
pub fn make_cylinder(radius: f64, height: f64, segments: u32) -> TriangleMesh {
    let segments = segments.max(3);
    let mut mesh = TriangleMesh::new();
    let half = height / 2.0;
    let ring: Vec<(f64, f64)> = (0..segments)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / segments as f64;
            (radius * a.cos(), radius * a.sin())
        })
        .collect();

    for i in 0..segments as usize {
        let j = (i + 1) % segments as usize;
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[j];
        let b0 = Point3::new(x0, y0, -half);
        let b1 = Point3::new(x1, y1, -half);
        let t0 = Point3::new(x0, y0, half);
        let t1 = Point3::new(x1, y1, half);

        // Side wall
        mesh.push_triangle(b0, b1, t1);
        mesh.push_triangle(b0, t1, t0);
        // Caps
        mesh.push_triangle(Point3::new(0.0, 0.0, half), t0, t1);
        mesh.push_triangle(Point3::new(0.0, 0.0, -half), b1, b0);
    }
    mesh
}
