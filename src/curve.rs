//! Two-parameter curve families.
//!
//! A curve family maps a pair of tangent angles, measured relative to a
//! segment's chord, to a curve in the unit-chord frame where the segment runs
//! from `(0, 0)` to `(1, 0)`.

use crate::math::Point2d;
use arrayvec::ArrayVec;
pub use natural::NaturalCubic;

mod natural;

/// Inner control points of one segment in the unit-chord frame.
///
/// The segment's endpoints are implied. Two points describe a single cubic;
/// eleven points describe four cubics, with the shared junction points
/// included between each group of inner control points.
pub type CurvePoints = ArrayVec<Point2d, 11>;

/// Curvature-angles at the two ends of a segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CurvatureAngles {
    /// Curvature-angle at the start of the segment.
    pub ak0: f64,
    /// Curvature-angle at the end of the segment.
    pub ak1: f64,
}

/// A family of curves parameterised by the entry and exit tangent angles.
///
/// # Parameters
/// Throughout, `th0` is the angle of the start tangent above the chord, and
/// `th1` is the angle of the end tangent below the chord, so that a symmetric
/// arc has `th0 == th1`.
pub trait CurveFamily {
    /// Renders the natural curve for the given tangent angles.
    fn render(&self, th0: f64, th1: f64) -> CurvePoints;

    /// Renders the curve, additionally imposing the curvature (in the
    /// unit-chord frame) at either end where it is given.
    fn render4(&self, th0: f64, th1: f64, k0: Option<f64>, k1: Option<f64>) -> CurvePoints;

    /// Computes the curvature-angles at either end of the natural curve.
    fn compute_curvature(&self, th0: f64, th1: f64) -> CurvatureAngles;

    /// The tangent angle at a free endpoint given the angle at the other end
    /// of the segment.
    fn endpoint_tangent(&self, th: f64) -> f64;
}

impl<T: CurveFamily + ?Sized> CurveFamily for &T {
    fn render(&self, th0: f64, th1: f64) -> CurvePoints {
        (**self).render(th0, th1)
    }

    fn render4(&self, th0: f64, th1: f64, k0: Option<f64>, k1: Option<f64>) -> CurvePoints {
        (**self).render4(th0, th1, k0, k1)
    }

    fn compute_curvature(&self, th0: f64, th1: f64) -> CurvatureAngles {
        (**self).compute_curvature(th0, th1)
    }

    fn endpoint_tangent(&self, th: f64) -> f64 {
        (**self).endpoint_tangent(th)
    }
}
