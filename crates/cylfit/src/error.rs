//! Error types for the fit engine.

use thiserror::Error;

/// Errors that can occur while fitting an item to a cylinder.
///
/// The engine never partially applies a transform: on any error the
/// wrapped item keeps the transform from the last successful fit.
#[derive(Error, Debug)]
pub enum FitError {
    /// Diameter or height is not a positive finite number.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The item has no mesh content, zero projected area, or a zero
    /// extent on an axis being divided by.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

impl From<cylfit_project::ProjectError> for FitError {
    fn from(err: cylfit_project::ProjectError) -> Self {
        FitError::DegenerateGeometry(err.to_string())
    }
}

/// Result type for fit operations.
pub type Result<T> = std::result::Result<T, FitError>;
