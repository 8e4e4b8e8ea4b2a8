use super::{CurvatureAngles, CurveFamily, CurvePoints};
use crate::math::{quintic_hermite, CubicBezier2d, ParametricCurve2d, Point2d, Vector2d};

/// Curvatures smaller than this are treated as this when rescaling derivatives.
const MIN_CURVATURE: f64 = 1e-6;

/// The natural cubic curve family.
///
/// The inner control points lie along the end tangents at a distance given by
/// a closed-form fit, which approximates a well-behaved family of curves
/// without integrating arc length.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaturalCubic;

impl NaturalCubic {
    /// Distance from an endpoint to its adjacent control point.
    fn handle_len(th0: f64, th1: f64) -> f64 {
        let offset = 0.3 * (2.0 * th1 - 0.4 * (2.0 * th1).sin()).sin();
        let th = th0 - offset;
        (th.cos() - 0.2 * (3.0 * th).cos()) / 2.4
    }

    /// The natural cubic for the given tangent angles, in the unit-chord frame.
    pub fn cubic(&self, th0: f64, th1: f64) -> CubicBezier2d {
        let len0 = Self::handle_len(th0, th1);
        let len1 = Self::handle_len(th1, th0);
        CubicBezier2d::unit_chord(
            Point2d::new(th0.cos() * len0, th0.sin() * len0),
            Point2d::new(1.0 - th1.cos() * len1, th1.sin() * len1),
        )
    }

    /// Rescales the end derivatives of the natural cubic so that its end
    /// curvatures move towards `k0` and `k1`.
    fn render4_cubic(&self, th0: f64, th1: f64, k0: Option<f64>, k1: Option<f64>) -> CubicBezier2d {
        let cb = self.cubic(th0, th1);
        let deriv_scale = |t: f64, th: f64, k: Option<f64>| match k {
            None => 1.0 / 3.0,
            Some(k) => {
                let mut old_k = tangent_curvature(&cb, t, th);
                if old_k.abs() < MIN_CURVATURE {
                    old_k = MIN_CURVATURE;
                }
                1.0 / (2.0 + k / old_k)
            }
        };
        let d0 = cb.sample_dt(0.0) * deriv_scale(0.0, th0, k0);
        let d1 = cb.sample_dt(1.0) * deriv_scale(1.0, -th1, k1);
        CubicBezier2d::unit_chord(
            Point2d::new(d0.x, d0.y),
            Point2d::new(1.0 - d1.x, -d1.y),
        )
    }

    /// Corrects the rescaled cubic with a quintic displacement so that its end
    /// curvatures match `k0` and `k1`, emitting four cubics.
    fn render4_quintic(&self, th0: f64, th1: f64, k0: Option<f64>, k1: Option<f64>) -> CurvePoints {
        let cb = self.render4_cubic(th0, th1, k0, k1);

        // Second derivative needed to reach the requested curvature, normal to the tangent
        let curv_adjust = |t: f64, th: f64, k: Option<f64>| -> Vector2d {
            let Some(k) = k else {
                return Vector2d::new(0.0, 0.0);
            };
            let (s, c) = th.sin_cos();
            let d = cb.sample_dt(t);
            let ddot = d.x * c + d.y * s;
            let a_adjust = (k - tangent_curvature(&cb, t, th)) * ddot * ddot;
            Vector2d::new(-s * a_adjust, c * a_adjust)
        };
        let a0 = curv_adjust(0.0, th0, k0);
        let a1 = curv_adjust(1.0, -th1, k1);
        let hx = quintic_hermite(0.0, 0.0, 0.0, 0.0, a0.x, a1.x);
        let hy = quintic_hermite(0.0, 0.0, 0.0, 0.0, a0.y, a1.y);
        let (hxd, hyd) = (hx.deriv(), hy.deriv());
        let h = |t: f64| Vector2d::new(hx.eval(t), hy.eval(t));
        let hd = |t: f64| Vector2d::new(hxd.eval(t), hyd.eval(t));

        let (left, right) = (cb.left_half(), cb.right_half());
        let quarters = [
            left.left_half(),
            left.right_half(),
            right.left_half(),
            right.right_half(),
        ];

        // Each quarter spans a quarter of the parameter range, so its handles are
        // a third of a quarter of the global derivative.
        let scale = 1.0 / 12.0;
        let mut result = CurvePoints::new();
        for (i, quarter) in quarters.iter().enumerate() {
            let t0 = 0.25 * i as f64;
            let t1 = t0 + 0.25;
            let [p0, p1, p2, _] = *quarter.points();
            if i != 0 {
                result.push(p0 + h(t0));
            }
            result.push(p1 + h(t0) + hd(t0) * scale);
            result.push(p2 + h(t1) - hd(t1) * scale);
        }
        result
    }
}

/// Curvature of `cb` at `t`, measured against the tangent direction `th`
/// rather than the derivative itself.
fn tangent_curvature(cb: &CubicBezier2d, t: f64, th: f64) -> f64 {
    let (d2cross, ddot) = tangent_components(cb, t, th);
    d2cross / (ddot * ddot)
}

/// The component of the second derivative normal to `th`, and the component of
/// the first derivative along `th`.
fn tangent_components(cb: &CubicBezier2d, t: f64, th: f64) -> (f64, f64) {
    let (s, c) = th.sin_cos();
    let d = cb.sample_dt(t);
    let d2 = cb.sample_dt2(t);
    (d2.y * c - d2.x * s, d.x * c + d.y * s)
}

impl CurveFamily for NaturalCubic {
    fn render(&self, th0: f64, th1: f64) -> CurvePoints {
        let [_, p1, p2, _] = *self.cubic(th0, th1).points();
        [p1, p2].into_iter().collect()
    }

    fn render4(&self, th0: f64, th1: f64, k0: Option<f64>, k1: Option<f64>) -> CurvePoints {
        if k0.is_none() && k1.is_none() {
            return self.render(th0, th1);
        }
        self.render4_quintic(th0, th1, k0, k1)
    }

    fn compute_curvature(&self, th0: f64, th1: f64) -> CurvatureAngles {
        let cb = self.cubic(th0, th1);
        // A handle pointing backwards flips the sign of `ddot`, pushing the
        // angle past ±π/2.
        let curv = |t: f64, th: f64| {
            let (d2cross, ddot) = tangent_components(&cb, t, th);
            d2cross.atan2(ddot * ddot.abs())
        };
        CurvatureAngles {
            ak0: curv(0.0, th0),
            ak1: curv(1.0, -th1),
        }
    }

    fn endpoint_tangent(&self, th: f64) -> f64 {
        0.5 * (2.0 * th).sin()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Assembles the cubics described by a segment's rendered points.
    fn pieces(points: &CurvePoints) -> Vec<CubicBezier2d> {
        let mut all = vec![Point2d::new(0.0, 0.0)];
        all.extend(points.iter().copied());
        all.push(Point2d::new(1.0, 0.0));
        all.windows(4)
            .step_by(3)
            .map(|p| CubicBezier2d::new(&[p[0], p[1], p[2], p[3]]))
            .collect()
    }

    #[test]
    fn straight_for_zero_angles() {
        let family = NaturalCubic;
        let points = family.render(0.0, 0.0);
        assert_eq!(points.len(), 2);
        for p in points {
            assert_approx_eq!(p.y, 0.0);
        }
        let aks = family.compute_curvature(0.0, 0.0);
        assert_approx_eq!(aks.ak0, 0.0);
        assert_approx_eq!(aks.ak1, 0.0);
    }

    #[test]
    fn handles_follow_tangents() {
        let family = NaturalCubic;
        let (th0, th1) = (0.4, -0.2);
        let cb = family.cubic(th0, th1);
        let d0 = cb.sample_dt(0.0);
        let d1 = cb.sample_dt(1.0);
        assert_approx_eq!(d0.y.atan2(d0.x), th0);
        assert_approx_eq!(d1.y.atan2(d1.x), -th1);
    }

    #[test]
    fn symmetric_arc_has_equal_end_curvatures() {
        let family = NaturalCubic;
        for th in [0.1, 0.5, 1.0, -0.7] {
            let aks = family.compute_curvature(th, th);
            assert_approx_eq!(aks.ak0, aks.ak1);
            // An arc bulging to the left of the chord turns clockwise
            assert_eq!(aks.ak0 < 0.0, th > 0.0);
        }
    }

    #[test]
    fn compute_curvature_matches_bezier() {
        let family = NaturalCubic;
        let (th0, th1) = (0.3, 0.5);
        let cb = family.cubic(th0, th1);
        let aks = family.compute_curvature(th0, th1);
        assert_approx_eq!(aks.ak0, cb.curvature(0.0).atan(), 1e-9);
        assert_approx_eq!(aks.ak1, cb.curvature(1.0).atan(), 1e-9);
    }

    #[test]
    fn endpoint_tangent_is_odd() {
        let family = NaturalCubic;
        assert_approx_eq!(family.endpoint_tangent(0.0), 0.0);
        assert_approx_eq!(family.endpoint_tangent(0.3), -family.endpoint_tangent(-0.3));
        assert_approx_eq!(family.endpoint_tangent(std::f64::consts::FRAC_PI_4), 0.5);
    }

    #[test]
    fn render4_without_curvature_is_natural() {
        let family = NaturalCubic;
        assert_eq!(family.render4(0.3, 0.2, None, None), family.render(0.3, 0.2));
    }

    #[test]
    fn render4_with_curvature_is_continuous() {
        let family = NaturalCubic;
        let points = family.render4(0.3, 0.4, Some(-1.5), Some(-2.0));
        assert_eq!(points.len(), 11);
        let pieces = pieces(&points);
        assert_eq!(pieces.len(), 4);
        for pair in pieces.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let p = a.sample(1.0);
            let q = b.sample(0.0);
            assert_approx_eq!(p.x, q.x);
            assert_approx_eq!(p.y, q.y);
            let da = a.sample_dt(1.0);
            let db = b.sample_dt(0.0);
            assert_approx_eq!(da.x, db.x, 1e-9);
            assert_approx_eq!(da.y, db.y, 1e-9);
        }
    }

    #[test]
    fn render4_approaches_requested_curvature() {
        let family = NaturalCubic;
        let (th0, th1) = (0.3, 0.4);
        let natural = family.cubic(th0, th1);
        let (k0, k1) = (natural.curvature(0.0) * 1.2, natural.curvature(1.0) * 0.9);
        let pieces = pieces(&family.render4(th0, th1, Some(k0), Some(k1)));
        assert_approx_eq!(pieces[0].curvature(0.0), k0, 0.06 * k0.abs());
        assert_approx_eq!(pieces[3].curvature(1.0), k1, 0.06 * k1.abs());
    }

    #[test]
    fn render4_preserves_end_tangents() {
        let family = NaturalCubic;
        let (th0, th1) = (0.25, -0.35);
        let pieces = pieces(&family.render4(th0, th1, Some(0.5), None));
        let d0 = pieces[0].sample_dt(0.0);
        let d1 = pieces[3].sample_dt(1.0);
        assert_approx_eq!(d0.y.atan2(d0.x), th0);
        assert_approx_eq!(d1.y.atan2(d1.x), -th1);
    }
}
