//! Scalar polynomials.

use smallvec::SmallVec;

/// A polynomial in one variable, stored as coefficients of ascending powers.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeffs: SmallVec<[f64; 6]>,
}

impl Polynomial {
    pub fn new(coeffs: &[f64]) -> Self {
        Self {
            coeffs: coeffs.into(),
        }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Evaluates the polynomial at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    /// Returns the derivative of this polynomial.
    pub fn deriv(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| i as f64 * c)
            .collect();
        Self { coeffs }
    }
}

/// Builds the quintic with value `x0`/`x1`, first derivative `v0`/`v1` and
/// second derivative `a0`/`a1` at `t = 0`/`t = 1`.
pub fn quintic_hermite(x0: f64, x1: f64, v0: f64, v1: f64, a0: f64, a1: f64) -> Polynomial {
    Polynomial::new(&[
        x0,
        v0,
        0.5 * a0,
        -10. * x0 + 10. * x1 - 6. * v0 - 4. * v1 - 1.5 * a0 + 0.5 * a1,
        15. * x0 - 15. * x1 + 8. * v0 + 7. * v1 + 1.5 * a0 - a1,
        -6. * x0 + 6. * x1 - 3. * v0 - 3. * v1 - 0.5 * a0 + 0.5 * a1,
    ])
}
