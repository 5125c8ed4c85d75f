#![warn(missing_docs)]

//! Fit an arbitrary triangle-mesh item into a bounding cylinder.
//!
//! The engine computes a scale + translate transform that fits a
//! mesh-bearing scene node into a cylinder of caller-specified diameter
//! and height, keeps the result cheap to recompute as parameters or the
//! mesh change, and memoizes bounding-box queries behind a key-checked
//! cache.
//!
//! # Example
//!
//! ```
//! use cylfit::cylfit_math::Transform;
//! use cylfit::cylfit_mesh::make_unit_cube;
//! use cylfit::cylfit_scene::MeshNode;
//! use cylfit::{FitParams, FitToCylinder};
//!
//! let item = MeshNode::with_mesh(make_unit_cube());
//! let params = FitParams {
//!     diameter: 2.0,
//!     height: 4.0,
//!     stretch_z: true,
//!     alternate_centering: false,
//! };
//! let mut fit = FitToCylinder::with_params(item, params).unwrap();
//! let aabb = fit.get_bounding_box(&Transform::identity()).unwrap();
//! assert!((aabb.z_size() - 4.0).abs() < 1e-6);
//! ```

pub use cylfit_enclose;
pub use cylfit_math;
pub use cylfit_mesh;
pub use cylfit_project;
pub use cylfit_scene;

pub mod error;
pub mod fit;

pub use error::{FitError, Result};
pub use fit::FitToCylinder;

use serde::{Deserialize, Serialize};

/// Parameters of a cylinder fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Target cylinder diameter (mm).
    pub diameter: f64,
    /// Target cylinder height (mm).
    pub height: f64,
    /// Stretch the item along Z to exactly the target height.
    pub stretch_z: bool,
    /// Center on the area-weighted visual center of the projected outline
    /// instead of the smallest enclosing circle of the projected vertices.
    pub alternate_centering: bool,
}

impl FitParams {
    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.diameter > 0.0) || !self.diameter.is_finite() {
            return Err(FitError::InvalidParameters(
                "diameter must be positive".into(),
            ));
        }
        if !(self.height > 0.0) || !self.height.is_finite() {
            return Err(FitError::InvalidParameters(
                "height must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            diameter: 1.0,
            height: 1.0,
            stretch_z: true,
            alternate_centering: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(FitParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nonpositive() {
        let mut p = FitParams::default();
        p.diameter = 0.0;
        assert!(matches!(
            p.validate(),
            Err(FitError::InvalidParameters(_))
        ));
        p.diameter = 1.0;
        p.height = -2.0;
        assert!(matches!(
            p.validate(),
            Err(FitError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut p = FitParams::default();
        p.height = f64::NAN;
        assert!(p.validate().is_err());
    }
}
