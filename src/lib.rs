//! Curvature-continuous splines through corner and smooth anchor points.
//!
//! A [Spline] is solved for tangent angles at each anchor, blended so that
//! curvature matches across smooth anchors, then rendered as cubic beziers
//! into a [PathSink].

pub use cgmath;
pub use config::{CornerTangent, SolverConfig};
pub use curve::{CurvatureAngles, CurveFamily, CurvePoints, NaturalCubic};
#[cfg(feature = "debug")]
pub use debug::take_debug_frame;
pub use error::SplineError;
pub use spline::{
    Anchor, AnchorKind, BezPath, ClosedRun, OpenRun, PathEl, PathSink, SegmentFrame, Spline,
};

mod config;
pub mod curve;
mod debug;
mod error;
pub mod math;
mod spline;
