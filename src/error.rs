//! Error types for spline input validation.

use thiserror::Error;

/// Malformed input detected by [crate::Spline::validate].
///
/// Solving and rendering never fail; these are only reported when the caller
/// asks for validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("anchor {index} has a non-finite position ({x}, {y})")]
    NonFiniteAnchor { index: usize, x: f64, y: f64 },

    #[error("anchor {index} has a non-finite fixed tangent angle {angle}")]
    NonFiniteAngle { index: usize, angle: f64 },
}
