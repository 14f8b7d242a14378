//! LMDP and MDP models plus the dynamics-source seams that feed them.

pub mod lmdp;
pub mod mdp;

pub use lmdp::Lmdp;
pub use mdp::Mdp;

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::error::{Error, Result};

/// Sparse probability row: `(successor index, probability)` pairs.
pub type TransitionRow = Vec<(usize, f64)>;

/// Tolerance for row-stochasticity checks.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Supplies the uncontrolled side of an LMDP: one passive probability row
/// per nonterminal state and a per-state reward vector.
///
/// Implementors fix an index order in which all nonterminal states precede
/// all terminal ones; rows are laid out entry-per-action in a canonical
/// action order.
pub trait PassiveDynamicsSource {
    /// Total number of states.
    fn n_states(&self) -> usize;

    /// Number of nonterminal states; terminal indices start here.
    fn n_nonterminal_states(&self) -> usize;

    /// Number of discrete actions mixed into each passive row.
    fn n_actions(&self) -> usize;

    /// Start state index.
    fn start_state(&self) -> usize;

    /// Passive rows, one per nonterminal state, entries in action order with
    /// duplicate successors merged into the first occurrence.
    fn passive_rows(&self) -> Result<Vec<TransitionRow>>;

    /// Rewards over all states, terminal entries included.
    fn rewards(&self) -> Array1<f64>;
}

/// Supplies action-conditioned dynamics for a standard MDP over the same
/// partitioned index order as [`PassiveDynamicsSource`].
pub trait ActionDynamicsSource {
    /// Total number of states.
    fn n_states(&self) -> usize;

    /// Number of nonterminal states; terminal indices start here.
    fn n_nonterminal_states(&self) -> usize;

    /// Number of discrete actions.
    fn n_actions(&self) -> usize;

    /// Start state index.
    fn start_state(&self) -> usize;

    /// Transition rows indexed `[nonterminal state][action]`.
    fn action_rows(&self) -> Result<Vec<Vec<TransitionRow>>>;

    /// Reward matrix of shape `(n_states, n_actions)`.
    fn action_rewards(&self) -> Array2<f64>;
}

/// Sum of the probabilities in a sparse row.
pub fn row_sum(row: &[(usize, f64)]) -> f64 {
    row.iter().map(|&(_, p)| p).sum()
}

/// Checks that `row` is a probability distribution: non-empty, finite
/// non-negative entries, sum within [`ROW_SUM_TOLERANCE`] of 1.
///
/// # Errors
///
/// Returns `Error::Normalization` naming `state` when the check fails. Rows
/// are never renormalized; a failure here points at a builder or extractor
/// bug upstream.
pub fn validate_row(row: &[(usize, f64)], state: usize) -> Result<()> {
    if row.is_empty() {
        return Err(Error::normalization(format!(
            "state {state} has an empty transition row"
        )));
    }
    for &(j, p) in row {
        if !p.is_finite() || p < 0.0 {
            return Err(Error::normalization(format!(
                "state {state} has probability {p} for successor {j}"
            )));
        }
    }
    let sum = row_sum(row);
    if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
        return Err(Error::normalization(format!(
            "transition row for state {state} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}

/// Samples a successor index from a probability row by walking the
/// cumulative sum, falling back to the last entry if rounding leaves the
/// draw above the accumulated total.
///
/// The row must already be validated; see [`validate_row`].
///
/// # Panics
///
/// Panics if `row` is empty.
pub fn sample_row<R: Rng>(row: &[(usize, f64)], rng: &mut R) -> usize {
    let draw: f64 = rng.gen();
    let mut acc = 0.0;
    for &(j, p) in row {
        acc += p;
        if draw < acc {
            return j;
        }
    }
    row[row.len() - 1].0
}
