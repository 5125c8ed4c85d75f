//! Error types for projection and centering.

use thiserror::Error;

/// Errors that can occur during projection or centering.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// No front-facing triangles survived the projection.
    #[error("projection is empty")]
    EmptyProjection,

    /// The projected polygon set has no usable area.
    #[error("projected outline has zero area")]
    ZeroArea,

    /// The projected shape has no radial extent to scale by.
    #[error("projected outline has zero radial extent")]
    ZeroExtent,
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectError>;
