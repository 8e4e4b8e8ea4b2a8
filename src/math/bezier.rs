use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// A cubic bezier curve
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CubicBezier2d {
    points: [Point2d; 4],
}

impl CubicBezier2d {
    pub const fn new(points: &[Point2d; 4]) -> Self {
        Self { points: *points }
    }

    /// Creates a cubic in the unit-chord frame, running from `(0, 0)` to `(1, 0)`
    /// through the two given inner control points.
    pub fn unit_chord(p1: Point2d, p2: Point2d) -> Self {
        Self::new(&[Point2d::new(0.0, 0.0), p1, p2, Point2d::new(1.0, 0.0)])
    }

    pub fn line(start: Point2d, end: Point2d) -> Self {
        let s = start.to_vec();
        let e = end.to_vec();
        let ps = [s, s.lerp(e, 1. / 3.), s.lerp(e, 2. / 3.), e];
        Self {
            points: ps.map(Point2d::from_vec),
        }
    }

    pub fn points(&self) -> &[Point2d; 4] {
        &self.points
    }

    pub fn subdivide(&self, t: f64) -> [CubicBezier2d; 2] {
        let [p00, p01, p02, p03] = self.points.map(|x| x.to_vec());
        let p10 = p00.lerp(p01, t);
        let p11 = p01.lerp(p02, t);
        let p12 = p02.lerp(p03, t);
        let p20 = p10.lerp(p11, t);
        let p21 = p11.lerp(p12, t);
        let p30 = p20.lerp(p21, t);
        let curves = [[p00, p10, p20, p30], [p30, p21, p12, p03]];
        curves.map(|p| CubicBezier2d {
            points: p.map(Point2d::from_vec),
        })
    }

    /// The first half of the curve, `t ∈ [0, 0.5]`, reparameterised over `[0, 1]`.
    pub fn left_half(&self) -> Self {
        let [p0, p1, p2, p3] = self.points.map(|x| x.to_vec());
        let ps = [
            p0,
            0.5 * (p0 + p1),
            0.25 * (p0 + 2.0 * p1 + p2),
            0.125 * (p0 + 3.0 * (p1 + p2) + p3),
        ];
        Self {
            points: ps.map(Point2d::from_vec),
        }
    }

    /// The second half of the curve, `t ∈ [0.5, 1]`, reparameterised over `[0, 1]`.
    pub fn right_half(&self) -> Self {
        let [p0, p1, p2, p3] = self.points.map(|x| x.to_vec());
        let ps = [
            0.125 * (p0 + 3.0 * (p1 + p2) + p3),
            0.25 * (p1 + 2.0 * p2 + p3),
            0.5 * (p2 + p3),
            p3,
        ];
        Self {
            points: ps.map(Point2d::from_vec),
        }
    }

    fn weighted_sum(&self, c: [f64; 4]) -> Vector2d {
        let [p0, p1, p2, p3] = self.points.map(|x| x.to_vec());
        c[0] * p0 + c[1] * p1 + c[2] * p2 + c[3] * p3
    }
}

impl ParametricCurve2d for CubicBezier2d {
    fn sample(&self, t: f64) -> Point2d {
        let t1 = 1.0 - t;
        Point2d::from_vec(self.weighted_sum([
            t1 * t1 * t1,
            3.0 * t1 * t1 * t,
            3.0 * t1 * t * t,
            t * t * t,
        ]))
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        let c0 = -3.0 * t1 * t1;
        let c3 = 3.0 * t * t;
        let c1 = -6.0 * t * t1 - c0;
        let c2 = 6.0 * t * t1 - c3;
        self.weighted_sum([c0, c1, c2, c3])
    }

    fn sample_dt2(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        let c0 = 6.0 * t1;
        let c3 = 6.0 * t;
        let c1 = 6.0 - 18.0 * t1;
        let c2 = 6.0 - 18.0 * t;
        self.weighted_sum([c0, c1, c2, c3])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    fn random_cubic(rng: &mut impl Rng) -> CubicBezier2d {
        let mut point = || Point2d::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        CubicBezier2d::new(&[point(), point(), point(), point()])
    }

    fn assert_points_eq(a: Point2d, b: Point2d) {
        assert_approx_eq!(a.x, b.x, 1e-9);
        assert_approx_eq!(a.y, b.y, 1e-9);
    }

    #[test]
    fn interpolates_endpoints() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..100 {
            let cubic = random_cubic(&mut rng);
            assert_points_eq(cubic.sample(0.0), cubic.points[0]);
            assert_points_eq(cubic.sample(1.0), cubic.points[3]);
        }
    }

    #[test]
    fn halves_meet_at_midpoint() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..100 {
            let cubic = random_cubic(&mut rng);
            let mid = cubic.sample(0.5);
            assert_points_eq(cubic.left_half().sample(1.0), mid);
            assert_points_eq(cubic.right_half().sample(0.0), mid);
            assert_points_eq(cubic.left_half().sample(0.5), cubic.sample(0.25));
            assert_points_eq(cubic.right_half().sample(0.5), cubic.sample(0.75));
        }
    }

    #[test]
    fn halves_match_subdivide() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        let cubic = random_cubic(&mut rng);
        let [left, right] = cubic.subdivide(0.5);
        for i in 0..4 {
            assert_points_eq(left.points[i], cubic.left_half().points[i]);
            assert_points_eq(right.points[i], cubic.right_half().points[i]);
        }
    }

    #[test]
    fn curvature_is_exact_at_start() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..100 {
            let cubic = random_cubic(&mut rng);
            let [p0, p1, p2, _] = cubic.points;
            let (d1, d2) = (p1 - p0, p2 - p1);
            let k = 2.0 / 3.0 * d1.perp_dot(d2) / d1.magnitude().powi(3);
            assert_approx_eq!(cubic.curvature(0.0), k, 1e-9 * k.abs().max(1.0));
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let cubic = CubicBezier2d::new(&[
            Point2d::new(0.0, 0.0),
            Point2d::new(0.3, 0.6),
            Point2d::new(0.8, -0.2),
            Point2d::new(1.0, 0.0),
        ]);
        let h = 1e-6;
        for t in [0.1, 0.4, 0.7] {
            let fd = (cubic.sample(t + h) - cubic.sample(t - h)) / (2.0 * h);
            let d = cubic.sample_dt(t);
            assert_approx_eq!(fd.x, d.x, 1e-6);
            assert_approx_eq!(fd.y, d.y, 1e-6);

            let fd2 = (cubic.sample_dt(t + h) - cubic.sample_dt(t - h)) / (2.0 * h);
            let d2 = cubic.sample_dt2(t);
            assert_approx_eq!(fd2.x, d2.x, 1e-5);
            assert_approx_eq!(fd2.y, d2.y, 1e-5);
        }
    }

    #[test]
    fn line_has_zero_curvature() {
        let line = CubicBezier2d::line(Point2d::new(1.0, 1.0), Point2d::new(4.0, 5.0));
        for t in [0.0, 0.5, 1.0] {
            assert_approx_eq!(line.curvature(t), 0.0);
            assert_approx_eq!(line.curvature_angle(t), 0.0);
        }
    }

    #[test]
    fn curvature_angle_is_finite_at_cusp() {
        let cubic = CubicBezier2d::unit_chord(Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0));
        let ak = cubic.curvature_angle(0.0);
        assert!(ak.is_finite());
    }

    #[test]
    fn quarter_circle_curvature() {
        // Standard cubic approximation of a unit quarter circle
        let k = 0.5522847498;
        let arc = CubicBezier2d::new(&[
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, k),
            Point2d::new(k, 1.0),
            Point2d::new(0.0, 1.0),
        ]);
        assert_approx_eq!(arc.curvature(0.0), 1.0, 0.05);
        assert_approx_eq!(arc.curvature(0.5), 1.0, 0.05);
        assert_approx_eq!(arc.curvature_angle(1.0), 1.0f64.atan(), 0.05);
    }
}
