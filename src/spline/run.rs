//! Tangent angle relaxation over runs of anchor points.
//!
//! Each relaxation pass takes one damped Newton step per joint, treating every
//! joint independently of its neighbours.

use crate::config::SolverConfig;
use crate::curve::{CurvatureAngles, CurveFamily};
use crate::debug::debug_relax;
use crate::math::{mod2pi, ChordFrame, Point2d};
use itertools::Itertools;
use smallvec::SmallVec;

/// The tangent angles of one segment relative to its chord.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentFrame {
    /// Angle of the start tangent above the chord.
    pub th0: f64,
    /// Angle of the end tangent below the chord.
    pub th1: f64,
    /// Length of the chord.
    pub chord: f64,
}

impl SegmentFrame {
    /// Computes the frame of the segment from `p0` to `p1`, given the absolute
    /// tangent angles at either end.
    pub fn new(p0: Point2d, p1: Point2d, th_start: f64, th_end: f64) -> Self {
        let frame = ChordFrame::new(p0, p1);
        let th = frame.angle();
        Self {
            th0: mod2pi(th_start - th),
            th1: mod2pi(th - th_end),
            chord: frame.length(),
        }
    }
}

/// Curvature continuity error at the joint between two segments.
///
/// The curvature-angles are weighted by the square root of the chord lengths,
/// so the error is measured in comparable units on either side.
fn joint_residual(
    left: &SegmentFrame,
    ak_left: CurvatureAngles,
    right: &SegmentFrame,
    ak_right: CurvatureAngles,
) -> f64 {
    let ch0 = left.chord.sqrt();
    let ch1 = right.chord.sqrt();
    let a0 = (ak_left.ak1.sin() * ch1).atan2(ak_left.ak1.cos() * ch0);
    let a1 = (ak_right.ak0.sin() * ch0).atan2(ak_right.ak0.cos() * ch1);
    a0 - a1
}

/// Newton step for the joint between two segments, which share the tangent
/// angle at the joint.
fn joint_step(
    curve: &impl CurveFamily,
    config: &SolverConfig,
    left: &SegmentFrame,
    ak_left: CurvatureAngles,
    right: &SegmentFrame,
    ak_right: CurvatureAngles,
) -> (f64, f64) {
    let err = joint_residual(left, ak_left, right, ak_right);

    // Turning the shared tangent clockwise by epsilon moves both frames at once
    let epsilon = config.derivative_epsilon;
    let ak_left_p = curve.compute_curvature(left.th0, left.th1 + epsilon);
    let ak_right_p = curve.compute_curvature(right.th0 - epsilon, right.th1);
    let err_p = joint_residual(left, ak_left_p, right, ak_right_p);
    let derr = (err_p - err) / epsilon;

    (err, config.newton_step(err, derr))
}

/// Seeds a tangent angle by distributing the bend between two chords in
/// proportion to their lengths.
fn bend_angle(p0: Point2d, p1: Point2d, p2: Point2d) -> f64 {
    let (c0, c1) = (ChordFrame::new(p0, p1), ChordFrame::new(p1, p2));
    let (l0, l1) = (c0.length(), c1.length());
    let bend = mod2pi(c1.angle() - c0.angle());
    let weight = if l0 + l1 > 0.0 { l0 / (l0 + l1) } else { 0.5 };
    mod2pi(c0.angle() + bend * weight)
}

/// A maximal run of points between two boundaries, whose interior tangent
/// angles are relaxed towards curvature continuity.
///
/// A boundary is either a fixed tangent angle or a free end.
#[derive(Clone, Debug)]
pub struct OpenRun<C> {
    curve: C,
    config: SolverConfig,
    points: SmallVec<[Point2d; 8]>,
    ths: SmallVec<[f64; 8]>,
    start_th: Option<f64>,
    end_th: Option<f64>,
}

impl<C: CurveFamily> OpenRun<C> {
    /// Creates a run through the given points with free ends.
    pub fn new(curve: C, points: impl IntoIterator<Item = Point2d>) -> Self {
        let points: SmallVec<_> = points.into_iter().collect();
        Self {
            curve,
            config: SolverConfig::default(),
            ths: smallvec::smallvec![0.0; points.len()],
            points,
            start_th: None,
            end_th: None,
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Fixes the tangent angles at the start and end of the run.
    pub fn with_boundary(mut self, start_th: Option<f64>, end_th: Option<f64>) -> Self {
        self.start_th = start_th;
        self.end_th = end_th;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The current absolute tangent angle at each point.
    pub fn angles(&self) -> &[f64] {
        &self.ths
    }

    /// Seeds the tangent angles from the chords.
    pub fn initial_ths(&mut self) -> &[f64] {
        let n = self.points.len();
        if n >= 2 {
            for (i, (&p0, &p1, &p2)) in self.points.iter().tuple_windows().enumerate() {
                self.ths[i + 1] = bend_angle(p0, p1, p2);
            }
            self.ths[0] = ChordFrame::new(self.points[0], self.points[1]).angle();
            self.ths[n - 1] = ChordFrame::new(self.points[n - 2], self.points[n - 1]).angle();
        }
        if let (Some(th), Some(first)) = (self.start_th, self.ths.first_mut()) {
            *first = th;
        }
        if let (Some(th), Some(last)) = (self.end_th, self.ths.last_mut()) {
            *last = th;
        }
        &self.ths
    }

    /// The frame of segment `i`, running from point `i` to point `i + 1`.
    pub fn segment_frame(&self, i: usize) -> SegmentFrame {
        SegmentFrame::new(self.points[i], self.points[i + 1], self.ths[i], self.ths[i + 1])
    }

    /// The curvature-angles at either end of segment `i`.
    pub fn segment_curvature(&self, i: usize) -> CurvatureAngles {
        let frame = self.segment_frame(i);
        self.curve.compute_curvature(frame.th0, frame.th1)
    }

    /// Performs one damped Newton pass, returning the total curvature
    /// continuity error measured before the update.
    pub fn relax(&mut self, iter: usize) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        // Free ends follow the curve family's natural end angle
        if self.start_th.is_none() {
            let frame = self.segment_frame(0);
            self.ths[0] += self.curve.endpoint_tangent(frame.th1) - frame.th0;
        }
        if self.end_th.is_none() {
            let frame = self.segment_frame(n - 2);
            self.ths[n - 1] -= self.curve.endpoint_tangent(frame.th0) - frame.th1;
        }
        if n < 3 {
            return 0.0;
        }

        let mut abs_err = 0.0;
        let mut steps = SmallVec::<[f64; 8]>::with_capacity(n - 2);
        let mut left = self.segment_frame(0);
        let mut ak_left = self.curve.compute_curvature(left.th0, left.th1);
        for i in 1..n - 1 {
            let right = self.segment_frame(i);
            let ak_right = self.curve.compute_curvature(right.th0, right.th1);
            let (err, step) = joint_step(&self.curve, &self.config, &left, ak_left, &right, ak_right);
            abs_err += err.abs();
            steps.push(step);
            (left, ak_left) = (right, ak_right);
        }

        let scale = self.config.damping(iter);
        for (th, step) in self.ths[1..n - 1].iter_mut().zip(steps) {
            *th += scale * step;
        }

        log::trace!("Relaxed run of {} points, pass {}: residual {}", n, iter, abs_err);
        debug_relax(iter, &self.ths, abs_err);
        abs_err
    }

    /// Seeds the angles and relaxes them for the configured number of passes,
    /// returning the residual of the final pass.
    pub fn solve(&mut self) -> f64 {
        self.initial_ths();
        let mut residual = 0.0;
        for iter in 0..self.config.iterations {
            residual = self.relax(iter);
            if self.config.converged(residual) {
                break;
            }
        }
        residual
    }
}

/// A closed loop of smooth points with no boundary, relaxed cyclically.
#[derive(Clone, Debug)]
pub struct ClosedRun<C> {
    curve: C,
    config: SolverConfig,
    points: SmallVec<[Point2d; 8]>,
    ths: SmallVec<[f64; 8]>,
}

impl<C: CurveFamily> ClosedRun<C> {
    /// Creates a closed loop through the given points.
    pub fn new(curve: C, points: impl IntoIterator<Item = Point2d>) -> Self {
        let points: SmallVec<_> = points.into_iter().collect();
        Self {
            curve,
            config: SolverConfig::default(),
            ths: smallvec::smallvec![0.0; points.len()],
            points,
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The current absolute tangent angle at each point.
    pub fn angles(&self) -> &[f64] {
        &self.ths
    }

    fn next(&self, i: usize) -> usize {
        (i + 1) % self.points.len()
    }

    /// Seeds the tangent angles from the chords, wrapping around the loop.
    pub fn initial_ths(&mut self) -> &[f64] {
        let n = self.points.len();
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = self.next(i);
            self.ths[i] = bend_angle(self.points[prev], self.points[i], self.points[next]);
        }
        &self.ths
    }

    /// The frame of segment `i`, running from point `i` to the next point.
    pub fn segment_frame(&self, i: usize) -> SegmentFrame {
        let j = self.next(i);
        SegmentFrame::new(self.points[i], self.points[j], self.ths[i], self.ths[j])
    }

    /// The curvature-angles at either end of segment `i`.
    pub fn segment_curvature(&self, i: usize) -> CurvatureAngles {
        let frame = self.segment_frame(i);
        self.curve.compute_curvature(frame.th0, frame.th1)
    }

    /// Performs one damped Newton pass over every joint of the loop,
    /// returning the total curvature continuity error before the update.
    pub fn relax(&mut self, iter: usize) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut abs_err = 0.0;
        let mut steps = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        for i in 0..n {
            let j = self.next(i);
            let left = self.segment_frame(i);
            let right = self.segment_frame(j);
            let ak_left = self.curve.compute_curvature(left.th0, left.th1);
            let ak_right = self.curve.compute_curvature(right.th0, right.th1);
            let (err, step) = joint_step(&self.curve, &self.config, &left, ak_left, &right, ak_right);
            abs_err += err.abs();
            steps[j] = step;
        }

        let scale = self.config.damping(iter);
        for (th, step) in self.ths.iter_mut().zip(steps) {
            *th += scale * step;
        }

        log::trace!("Relaxed closed loop of {} points, pass {}: residual {}", n, iter, abs_err);
        debug_relax(iter, &self.ths, abs_err);
        abs_err
    }

    /// Seeds the angles and relaxes them for the configured number of passes,
    /// returning the residual of the final pass. Loops of fewer than three
    /// points are left untouched.
    pub fn solve(&mut self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.initial_ths();
        let mut residual = 0.0;
        for iter in 0..self.config.iterations {
            residual = self.relax(iter);
            if self.config.converged(residual) {
                break;
            }
        }
        residual
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::curve::NaturalCubic;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_4;

    fn points(ps: &[(f64, f64)]) -> Vec<Point2d> {
        ps.iter().map(|&(x, y)| Point2d::new(x, y)).collect()
    }

    #[test]
    fn initial_ths_distribute_bend() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]));
        let ths = run.initial_ths().to_vec();
        assert_approx_eq!(ths[0], FRAC_PI_4);
        assert_approx_eq!(ths[1], 0.0);
        assert_approx_eq!(ths[2], -FRAC_PI_4);
    }

    #[test]
    fn initial_ths_weight_by_chord_length() {
        // A short chord followed by a long one pulls the angle towards the short chord
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 0.), (1., 3.)]));
        let ths = run.initial_ths().to_vec();
        assert_approx_eq!(ths[1], 0.25 * std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn boundary_overrides_seed() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]))
            .with_boundary(Some(0.1), Some(-0.2));
        let ths = run.initial_ths().to_vec();
        assert_eq!(ths[0], 0.1);
        assert_eq!(ths[2], -0.2);
    }

    #[test]
    fn segment_frame_is_relative_to_chord() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]));
        run.initial_ths();
        let frame = run.segment_frame(0);
        assert_approx_eq!(frame.th0, 0.0);
        assert_approx_eq!(frame.th1, FRAC_PI_4);
        assert_approx_eq!(frame.chord, std::f64::consts::SQRT_2);
    }

    #[test]
    fn fixed_boundaries_are_kept() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]))
            .with_boundary(Some(FRAC_PI_4), Some(-FRAC_PI_4));
        run.solve();
        assert_eq!(run.angles()[0], FRAC_PI_4);
        assert_eq!(run.angles()[2], -FRAC_PI_4);
        // Symmetric input stays symmetric
        assert_approx_eq!(run.angles()[1], 0.0);
    }

    #[test]
    fn symmetric_joint_has_no_residual() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]))
            .with_boundary(Some(FRAC_PI_4), Some(-FRAC_PI_4));
        run.initial_ths();
        assert_approx_eq!(run.relax(0), 0.0);
    }

    #[test]
    fn residual_decays() {
        let mut run = OpenRun::new(
            NaturalCubic,
            points(&[(0., 0.), (1., 0.6), (2.5, 1.0), (4., 0.7), (5., 0.)]),
        )
        .with_boundary(Some(0.5), Some(-0.6));
        run.initial_ths();
        let residuals = (0..10).map(|i| run.relax(i)).collect::<Vec<_>>();
        assert!(residuals[0] > 1e-3);
        assert!(residuals[9] < 0.1 * residuals[0]);
        for pair in residuals.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12, "{:?}", residuals);
        }
    }

    #[test]
    fn free_ends_relax_towards_endpoint_tangent() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]));
        run.solve();
        let frame = run.segment_frame(0);
        assert_approx_eq!(frame.th0, NaturalCubic.endpoint_tangent(frame.th1), 1e-3);
    }

    #[test]
    fn two_point_run() {
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (2., 2.)]))
            .with_boundary(None, Some(FRAC_PI_4));
        assert_eq!(run.solve(), 0.0);
        assert_approx_eq!(run.angles()[0], FRAC_PI_4);
    }

    #[test]
    fn tolerance_stops_early() {
        let config = SolverConfig {
            tolerance: Some(1.0),
            ..Default::default()
        };
        let mut run = OpenRun::new(NaturalCubic, points(&[(0., 0.), (1., 1.), (2., 0.)]))
            .with_boundary(Some(FRAC_PI_4), Some(-FRAC_PI_4))
            .with_config(config);
        assert!(run.solve() < 1.0);
    }

    #[test]
    fn closed_square_is_symmetric() {
        let mut run = ClosedRun::new(NaturalCubic, points(&[(0., 0.), (1., 0.), (1., 1.), (0., 1.)]));
        run.solve();
        let aks = (0..4).map(|i| run.segment_curvature(i)).collect::<Vec<_>>();
        for ak in &aks {
            assert_approx_eq!(ak.ak0, aks[0].ak0, 1e-9);
            assert_approx_eq!(ak.ak1, aks[0].ak0, 1e-9);
        }
        // The tangents of a counter-clockwise square point along the circumscribed circle
        assert_approx_eq!(mod2pi(run.angles()[0]), -FRAC_PI_4, 1e-9);
    }

    #[test]
    fn closed_loop_too_small() {
        let mut run = ClosedRun::new(NaturalCubic, points(&[(0., 0.), (1., 0.)]));
        assert_eq!(run.solve(), 0.0);
        assert_eq!(run.angles(), &[0.0, 0.0]);
    }
}
