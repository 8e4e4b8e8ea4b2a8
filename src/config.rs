//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a corner without a fixed angle chooses its tangent towards a smooth run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CornerTangent {
    /// The tangent points along the adjacent chord.
    #[default]
    Chord,
    /// The tangent is left free and relaxed towards the curve family's
    /// natural endpoint angle.
    Natural,
}

/// Parameters of the tangent angle solver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Number of relaxation passes per run.
    pub iterations: usize,
    /// If set, a run stops relaxing once its total residual drops below this.
    pub tolerance: Option<f64>,
    /// Step used for the forward-difference derivative of the residual.
    pub derivative_epsilon: f64,
    /// Newton steps are skipped where the residual's derivative is this small.
    pub min_derivative: f64,
    /// Treatment of unconstrained corners at the ends of a run.
    pub corner_tangent: CornerTangent,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            tolerance: None,
            derivative_epsilon: 1e-3,
            min_derivative: 1e-9,
            corner_tangent: CornerTangent::Chord,
        }
    }
}

impl SolverConfig {
    /// The damping applied to the Newton step of the given pass, ramping from
    /// about a quarter towards one.
    pub fn damping(&self, iter: usize) -> f64 {
        (0.25 * (iter + 1) as f64).tanh()
    }

    /// The Newton step for residual `err` with derivative `derr`, or zero
    /// where the derivative is too flat to produce a finite step.
    pub fn newton_step(&self, err: f64, derr: f64) -> f64 {
        if derr.abs() <= self.min_derivative {
            log::debug!("Skipping Newton step, derivative {} too small", derr);
            return 0.0;
        }
        let step = err / derr;
        if step.is_finite() {
            step
        } else {
            0.0
        }
    }

    /// Whether a run with the given total residual can stop early.
    pub fn converged(&self, residual: f64) -> bool {
        self.tolerance.map_or(false, |tol| residual < tol)
    }
}
