use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// A parametric curve in 2D space, parameterised over `[0, 1]`.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Samples the derivative of the parametric curve.
    fn sample_dt(&self, t: f64) -> Vector2d;

    /// Samples the second derivative of the parametric curve.
    fn sample_dt2(&self, t: f64) -> Vector2d;

    /// The signed curvature of the curve.
    fn curvature(&self, t: f64) -> f64 {
        let d = self.sample_dt(t);
        let d2 = self.sample_dt2(t);
        d.perp_dot(d2) / d.magnitude().powi(3)
    }

    /// The arctangent-compressed curvature, `atan2(d × d2, |d|³)`.
    ///
    /// Unlike [ParametricCurve2d::curvature] this stays finite where the
    /// derivative vanishes.
    fn curvature_angle(&self, t: f64) -> f64 {
        let d = self.sample_dt(t);
        let d2 = self.sample_dt2(t);
        d.perp_dot(d2).atan2(d.magnitude().powi(3))
    }
}
