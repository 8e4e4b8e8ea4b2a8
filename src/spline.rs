use crate::config::{CornerTangent, SolverConfig};
use crate::curve::{CurveFamily, NaturalCubic};
use crate::debug::debug_blend;
use crate::error::SplineError;
use crate::math::{mod2pi, ChordFrame, Point2d};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::iter::once;

pub use run::{ClosedRun, OpenRun, SegmentFrame};
pub use sink::{BezPath, PathEl, PathSink};

mod run;
mod sink;

/// Whether an anchor breaks or joins the curve.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnchorKind {
    /// Tangent and curvature may change abruptly.
    Corner,
    /// Tangent and curvature are continuous.
    #[default]
    Smooth,
}

/// A point the spline passes through.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anchor {
    /// Position of the anchor.
    pub position: Point2d,
    /// Corner or smooth.
    pub kind: AnchorKind,
    /// User-imposed tangent angle of the incoming segment, in radians.
    pub fixed_left_angle: Option<f64>,
    /// User-imposed tangent angle of the outgoing segment, in radians.
    pub fixed_right_angle: Option<f64>,
    /// Solved tangent angle of the incoming segment.
    pub left_angle: f64,
    /// Solved tangent angle of the outgoing segment.
    pub right_angle: f64,
    /// Curvature-angle at the end of the incoming segment.
    pub left_curvature_angle: Option<f64>,
    /// Curvature-angle at the start of the outgoing segment.
    pub right_curvature_angle: Option<f64>,
    /// Curvature imposed at this anchor when rendering.
    pub blended_curvature: Option<f64>,
}

impl Anchor {
    /// Creates an anchor with no fixed tangents.
    pub fn new(position: Point2d, kind: AnchorKind) -> Self {
        Self {
            position,
            kind,
            fixed_left_angle: None,
            fixed_right_angle: None,
            left_angle: 0.0,
            right_angle: 0.0,
            left_curvature_angle: None,
            right_curvature_angle: None,
            blended_curvature: None,
        }
    }

    pub fn corner(x: f64, y: f64) -> Self {
        Self::new(Point2d::new(x, y), AnchorKind::Corner)
    }

    pub fn smooth(x: f64, y: f64) -> Self {
        Self::new(Point2d::new(x, y), AnchorKind::Smooth)
    }

    pub fn with_fixed_left(mut self, angle: f64) -> Self {
        self.fixed_left_angle = Some(angle);
        self
    }

    pub fn with_fixed_right(mut self, angle: f64) -> Self {
        self.fixed_right_angle = Some(angle);
        self
    }

    pub fn is_corner(&self) -> bool {
        self.kind == AnchorKind::Corner
    }

    /// Whether the anchor splits the spline into independently solved runs.
    pub fn is_boundary(&self) -> bool {
        self.is_corner() || self.fixed_left_angle.is_some() || self.fixed_right_angle.is_some()
    }

    /// The tangent angle imposed on the incoming segment. A smooth anchor
    /// with only one fixed side uses it on both sides.
    pub fn left_constraint(&self) -> Option<f64> {
        match self.kind {
            AnchorKind::Corner => self.fixed_left_angle,
            AnchorKind::Smooth => self.fixed_left_angle.or(self.fixed_right_angle),
        }
    }

    /// The tangent angle imposed on the outgoing segment.
    pub fn right_constraint(&self) -> Option<f64> {
        match self.kind {
            AnchorKind::Corner => self.fixed_right_angle,
            AnchorKind::Smooth => self.fixed_right_angle.or(self.fixed_left_angle),
        }
    }

    fn clear_solution(&mut self) {
        self.left_angle = 0.0;
        self.right_angle = 0.0;
        self.left_curvature_angle = None;
        self.right_curvature_angle = None;
    }
}

/// A spline through a sequence of anchors.
///
/// Solving happens in three passes, each writing into the anchors:
/// [Spline::solve] chooses tangent angles, [Spline::compute_curvature_blending]
/// chooses the curvature at smooth anchors, and [Spline::render] emits cubics.
#[derive(Clone, Debug)]
pub struct Spline<C = NaturalCubic> {
    anchors: Vec<Anchor>,
    closed: bool,
    curve: C,
    config: SolverConfig,
}

impl Spline<NaturalCubic> {
    /// Creates a spline using the natural cubic curve family.
    pub fn new(anchors: Vec<Anchor>, closed: bool) -> Self {
        Self::with_curve(anchors, closed, NaturalCubic)
    }

    /// Creates a spline, first checking that every anchor is finite.
    pub fn try_new(anchors: Vec<Anchor>, closed: bool) -> Result<Self, SplineError> {
        let spline = Self::new(anchors, closed);
        spline.validate()?;
        Ok(spline)
    }
}

impl<C: CurveFamily> Spline<C> {
    /// Creates a spline using the given curve family.
    pub fn with_curve(anchors: Vec<Anchor>, closed: bool, curve: C) -> Self {
        Self {
            anchors,
            closed,
            curve,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut [Anchor] {
        &mut self.anchors
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The number of segments: one per anchor when closed, one fewer when open.
    pub fn segment_count(&self) -> usize {
        match (self.anchors.len(), self.closed) {
            (0, _) => 0,
            (n, true) => n,
            (n, false) => n - 1,
        }
    }

    /// Checks that every position and fixed angle is finite.
    pub fn validate(&self) -> Result<(), SplineError> {
        for (index, anchor) in self.anchors.iter().enumerate() {
            let Point2d { x, y } = anchor.position;
            if !x.is_finite() || !y.is_finite() {
                return Err(SplineError::NonFiniteAnchor { index, x, y });
            }
            let fixed = [anchor.fixed_left_angle, anchor.fixed_right_angle];
            if let Some(angle) = fixed.into_iter().flatten().find(|a| !a.is_finite()) {
                return Err(SplineError::NonFiniteAngle { index, angle });
            }
        }
        Ok(())
    }

    /// Index of the `i`th anchor counting from `start`, wrapping around.
    fn idx(&self, i: usize, start: usize) -> usize {
        (i + start) % self.anchors.len()
    }

    /// Length of the chord from anchor `i` to the next anchor.
    fn chord_len(&self, i: usize) -> f64 {
        let n = self.anchors.len();
        ChordFrame::new(self.anchors[i % n].position, self.anchors[(i + 1) % n].position).length()
    }

    fn chord_angle(&self, from: usize, to: usize) -> f64 {
        ChordFrame::new(self.anchors[from].position, self.anchors[to].position).angle()
    }

    /// The anchor the solve walk starts from: the first boundary of a closed
    /// spline, otherwise the first anchor.
    fn start_ix(&self) -> usize {
        if !self.closed {
            return 0;
        }
        self.anchors.iter().position(Anchor::is_boundary).unwrap_or(0)
    }

    /// Tangent angle imposed on a run's end by an anchor without a fixed angle.
    fn implied_boundary(&self, anchor: usize, from: usize, to: usize) -> Option<f64> {
        match self.config.corner_tangent {
            CornerTangent::Chord if self.anchors[anchor].is_corner() => Some(self.chord_angle(from, to)),
            _ => None,
        }
    }

    /// Solves the tangent angles and end curvature-angles of every segment.
    pub fn solve(&mut self) {
        self.anchors.iter_mut().for_each(Anchor::clear_solution);
        let n = self.anchors.len();
        if n < 2 {
            return;
        }
        if self.closed && !self.anchors.iter().any(Anchor::is_boundary) {
            self.solve_closed_smooth();
            return;
        }

        let start = self.start_ix();
        let length = self.segment_count();
        let mut runs = 0;
        let mut i = 0;
        while i < length {
            let (a, b) = (self.idx(i, start), self.idx(i + 1, start));
            let straight = (i + 1 == length || self.anchors[b].is_corner())
                && self.anchors[a].right_constraint().is_none()
                && self.anchors[b].left_constraint().is_none();
            if straight {
                let th = self.chord_angle(a, b);
                self.anchors[a].right_angle = th;
                self.anchors[a].right_curvature_angle = Some(0.0);
                self.anchors[b].left_angle = th;
                self.anchors[b].left_curvature_angle = Some(0.0);
                i += 1;
                continue;
            }

            // Extend the run up to and including the next boundary
            let mut j = i + 1;
            while j < length + 1 {
                let boundary = self.anchors[self.idx(j, start)].is_boundary();
                j += 1;
                if boundary {
                    break;
                }
            }
            let ixs = (i..j).map(|k| self.idx(k, start)).collect::<Vec<_>>();
            let (first, last) = (ixs[0], ixs[ixs.len() - 1]);
            let start_th = self.anchors[first]
                .right_constraint()
                .or_else(|| self.implied_boundary(first, first, ixs[1]));
            let end_th = self.anchors[last]
                .left_constraint()
                .or_else(|| self.implied_boundary(last, ixs[ixs.len() - 2], last));

            let mut run = OpenRun::new(&self.curve, ixs.iter().map(|&k| self.anchors[k].position))
                .with_config(self.config)
                .with_boundary(start_th, end_th);
            let residual = run.solve();
            log::trace!("Solved run of {} anchors from {}: residual {}", ixs.len(), first, residual);

            for (r, (&k0, &k1)) in ixs.iter().tuple_windows().enumerate() {
                let aks = run.segment_curvature(r);
                self.anchors[k0].right_angle = mod2pi(run.angles()[r]);
                self.anchors[k0].right_curvature_angle = Some(aks.ak0);
                self.anchors[k1].left_angle = mod2pi(run.angles()[r + 1]);
                self.anchors[k1].left_curvature_angle = Some(aks.ak1);
            }
            runs += 1;
            i = j - 1;
        }
        log::debug!("Solved spline of {} anchors in {} runs", n, runs);
    }

    /// Solves a closed spline with no corners or fixed angles, relaxing every
    /// joint around the loop. Does nothing for fewer than three anchors.
    pub fn solve_closed_smooth(&mut self) {
        let n = self.anchors.len();
        if n < 3 {
            return;
        }
        let mut run = ClosedRun::new(&self.curve, self.anchors.iter().map(|a| a.position))
            .with_config(self.config);
        let residual = run.solve();
        log::debug!("Solved closed smooth spline of {} anchors: residual {}", n, residual);

        for i in 0..n {
            let th = mod2pi(run.angles()[i]);
            let aks = run.segment_curvature(i);
            let anchor = &mut self.anchors[i];
            anchor.left_angle = th;
            anchor.right_angle = th;
            anchor.right_curvature_angle = Some(aks.ak0);
            self.anchors[(i + 1) % n].left_curvature_angle = Some(aks.ak1);
        }
    }

    /// Chooses the curvature imposed at each smooth anchor from the solved
    /// curvature-angles on either side.
    ///
    /// Where the curve inflects at the anchor the curvature is zero; otherwise
    /// it is the harmonic mean of the curvatures of the two sides.
    pub fn compute_curvature_blending(&mut self) {
        let n = self.anchors.len();
        for i in 0..n {
            let anchor = &self.anchors[i];
            let blended = match (anchor.kind, anchor.left_curvature_angle, anchor.right_curvature_angle) {
                (AnchorKind::Smooth, Some(l_ak), Some(r_ak)) => {
                    let k = if sign(r_ak) != sign(l_ak) {
                        0.0
                    } else {
                        let r_k = fold_tan(r_ak) / self.chord_len(i + n - 1);
                        let l_k = fold_tan(l_ak) / self.chord_len(i);
                        2.0 / (1.0 / r_k + 1.0 / l_k)
                    };
                    // Coincident anchors leave nothing sensible to impose
                    let k = if k.is_finite() { k } else { 0.0 };
                    debug_blend(i, k);
                    Some(k)
                }
                _ => None,
            };
            self.anchors[i].blended_curvature = blended;
        }
    }

    /// Emits the solved spline as cubic segments.
    ///
    /// Each segment is preceded by a call to [PathSink::mark] with the index of
    /// its starting anchor, then emits one cubic, or four where a curvature is
    /// imposed at either end.
    pub fn render(&self, sink: &mut impl PathSink) {
        let Some(first) = self.anchors.first() else {
            return;
        };
        sink.move_to(first.position);
        let n = self.anchors.len();
        for i in 0..self.segment_count() {
            sink.mark(i);
            let (a, b) = (&self.anchors[i], &self.anchors[(i + 1) % n]);
            let frame = ChordFrame::new(a.position, b.position);
            let (chth, chord) = (frame.angle(), frame.length());
            let th0 = mod2pi(a.right_angle - chth);
            let th1 = mod2pi(chth - b.left_angle);
            let k0 = a.blended_curvature.map(|k| k * chord);
            let k1 = b.blended_curvature.map(|k| k * chord);
            let points = self.curve.render4(th0, th1, k0, k1);
            let world = points
                .iter()
                .map(|&p| frame.to_world(p))
                .chain(once(b.position));
            for (p1, p2, p3) in world.tuples() {
                sink.curve_to(p1, p2, p3);
            }
        }
        if self.closed {
            sink.close_path();
        }
    }

    /// Renders the spline into a new [BezPath].
    pub fn render_path(&self) -> BezPath {
        let mut path = BezPath::new();
        self.render(&mut path);
        path
    }

    /// Runs all three passes and returns the rendered path.
    pub fn fit(&mut self) -> BezPath {
        self.solve();
        self.compute_curvature_blending();
        self.render_path()
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Tangent of a curvature-angle, reflected about ±π/2 so that angles past a
/// right angle do not diverge.
fn fold_tan(th: f64) -> f64 {
    if th > FRAC_PI_2 {
        (PI - th).tan()
    } else if th < -FRAC_PI_2 {
        (-PI - th).tan()
    } else {
        th.tan()
    }
}
