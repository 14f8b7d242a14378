//! Solvers: power iteration for the desirability function, optimal-policy
//! extraction, the embedding into a standard MDP, and value iteration.

pub mod embedding;
pub mod policy;
pub mod power_iteration;
pub mod value_iteration;

pub use embedding::{embed_lmdp, embed_policy};
pub use policy::optimal_policy;
pub use power_iteration::{power_iteration, sweep};
pub use value_iteration::value_iteration;

use ndarray::Array1;

/// Configuration for the LMDP power-iteration solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Temperature of the exponentiated Bellman operator. Must be positive.
    pub lambda: f64,
    /// Convergence threshold on the max per-state change of one sweep.
    pub epsilon: f64,
    /// Iteration bound before the solver reports non-convergence.
    pub max_iterations: usize,
}

impl SolverConfig {
    /// Unit temperature, `1e-10` tolerance, and a bound of `100_000` sweeps.
    pub fn new() -> Self {
        SolverConfig {
            lambda: 1.0,
            epsilon: 1e-10,
            max_iterations: 100_000,
        }
    }

    /// Sets the temperature.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovers the value function from a desirability function:
/// `V(s) = lambda * ln(Z(s))`.
///
/// States with `Z = 0` map to `-inf`, which is the correct value of a state
/// that cannot reach a terminal state.
pub fn value_function(z: &Array1<f64>, lambda: f64) -> Array1<f64> {
    z.mapv(|v| lambda * v.ln())
}
