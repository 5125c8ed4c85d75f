#![warn(missing_docs)]

//! Orthographic Z projection and 2D shape analysis for the cylfit engine.
//!
//! Projects triangle meshes onto the XY plane, extracts closed polygon
//! outlines with signed winding, and computes the area-weighted visual
//! center used by the alternate centering mode.

pub mod center;
pub mod error;
pub mod outline;
pub mod polygon;
pub mod project;

pub use center::{visual_center, VisualCenter};
pub use error::{ProjectError, Result};
pub use outline::outlines_from_triangles;
pub use polygon::{filter_holes, Polygon};
pub use project::{project_to_xy, project_vertices, Triangle2};
