//! Output of rendered splines.

use crate::math::{CubicBezier2d, Point2d};
use itertools::Itertools;
use std::fmt::Write;

/// Receives the cubic segments of a rendered spline.
pub trait PathSink {
    /// Starts a new subpath at the given point.
    fn move_to(&mut self, p: Point2d);

    /// Appends a cubic from the current point through two control points to `p3`.
    fn curve_to(&mut self, p1: Point2d, p2: Point2d, p3: Point2d);

    /// Closes the current subpath.
    fn close_path(&mut self);

    /// Called before the pieces of the segment starting at anchor `segment`
    /// are emitted.
    fn mark(&mut self, segment: usize);
}

impl<T: PathSink + ?Sized> PathSink for &mut T {
    fn move_to(&mut self, p: Point2d) {
        (**self).move_to(p)
    }

    fn curve_to(&mut self, p1: Point2d, p2: Point2d, p3: Point2d) {
        (**self).curve_to(p1, p2, p3)
    }

    fn close_path(&mut self) {
        (**self).close_path()
    }

    fn mark(&mut self, segment: usize) {
        (**self).mark(segment)
    }
}

/// A single path command.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathEl {
    MoveTo(Point2d),
    CurveTo(Point2d, Point2d, Point2d),
    ClosePath,
    Mark(usize),
}

/// A path sink which records every command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BezPath {
    elements: Vec<PathEl>,
}

impl BezPath {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.elements.last() == Some(&PathEl::ClosePath)
    }

    /// The cubics of the path, each tagged with the segment it was emitted for.
    pub fn segments(&self) -> Vec<(usize, CubicBezier2d)> {
        let mut result = vec![];
        let mut current = None;
        let mut segment = 0;
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => current = Some(p),
                PathEl::Mark(i) => segment = i,
                PathEl::CurveTo(p1, p2, p3) => {
                    if let Some(p0) = current {
                        result.push((segment, CubicBezier2d::new(&[p0, p1, p2, p3])));
                    }
                    current = Some(p3);
                }
                PathEl::ClosePath => {}
            }
        }
        result
    }

    /// Formats the path as SVG path data.
    pub fn to_svg(&self) -> String {
        let fmt = |p: &Point2d| format!("{} {}", p.x, p.y);
        let mut svg = String::new();
        for el in &self.elements {
            match el {
                PathEl::MoveTo(p) => {
                    write!(svg, "M{}", fmt(p)).unwrap();
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    write!(svg, "C{}", [p1, p2, p3].into_iter().map(fmt).join(" ")).unwrap();
                }
                PathEl::ClosePath => svg.push('Z'),
                PathEl::Mark(_) => {}
            }
        }
        svg
    }
}

impl PathSink for BezPath {
    fn move_to(&mut self, p: Point2d) {
        self.elements.push(PathEl::MoveTo(p));
    }

    fn curve_to(&mut self, p1: Point2d, p2: Point2d, p3: Point2d) {
        self.elements.push(PathEl::CurveTo(p1, p2, p3));
    }

    fn close_path(&mut self) {
        self.elements.push(PathEl::ClosePath);
    }

    fn mark(&mut self, segment: usize) {
        self.elements.push(PathEl::Mark(segment));
    }
}
