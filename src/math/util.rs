use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use std::f64::consts::{PI, TAU};

/// Wraps an angle into the interval (-π, π].
pub fn mod2pi(th: f64) -> f64 {
    let th = th - TAU * (th / TAU).round();
    if th <= -PI {
        th + TAU
    } else if th > PI {
        th - TAU
    } else {
        th
    }
}

/// The direction of a vector in radians, or zero for a zero vector.
pub fn angle_of(vec: Vector2d) -> f64 {
    vec.y.atan2(vec.x)
}

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// The coordinate system of a single segment, in which its start point
/// is `(0, 0)` and its end point is `(1, 0)`.
#[derive(Copy, Clone, Debug)]
pub struct ChordFrame {
    origin: Point2d,
    chord: Vector2d,
}

impl ChordFrame {
    /// Creates the chord frame of the segment from `start` to `end`.
    pub fn new(start: Point2d, end: Point2d) -> Self {
        Self {
            origin: start,
            chord: end - start,
        }
    }

    /// The direction of the chord in radians.
    pub fn angle(&self) -> f64 {
        angle_of(self.chord)
    }

    /// The length of the chord.
    pub fn length(&self) -> f64 {
        self.chord.magnitude()
    }

    /// Maps a point from the unit-chord frame back into world coordinates.
    pub fn to_world(&self, local: Point2d) -> Point2d {
        self.origin + self.chord * local.x + rot90(self.chord) * local.y
    }
}
