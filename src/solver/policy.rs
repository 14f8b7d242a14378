use ndarray::Array1;

use crate::error::{Error, Result};
use crate::model::{Lmdp, TransitionRow};

/// Derives the optimal controlled transition rows `Pu` from a desirability
/// function by exponential tilting:
/// `Pu[s][s'] = P0[s][s'] * Z[s'] / (P0[s] . Z)`.
///
/// Works entry-wise on the sparse rows, so entry order and support carry
/// over from `P0` unchanged; successors outside a row's support stay
/// outside it.
///
/// # Panics
///
/// Panics if `z` does not have one entry per state.
///
/// # Errors
///
/// Returns `Error::Normalization` naming the first state whose tilting
/// denominator is not positive, which is how a state that cannot reach any
/// terminal state (`Z = 0` across its successors) surfaces here. The row is
/// never silently renormalized.
pub fn optimal_policy(lmdp: &Lmdp, z: &Array1<f64>) -> Result<Vec<TransitionRow>> {
    assert_eq!(z.len(), lmdp.n_states, "desirability length mismatch");
    let mut pu = Vec::with_capacity(lmdp.n_nonterminal_states);
    for (s, row) in lmdp.p0.iter().enumerate() {
        let weight: f64 = row.iter().map(|&(j, p)| p * z[j]).sum();
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::normalization(format!(
                "state {s} has no successor with positive desirability"
            )));
        }
        pu.push(
            row.iter()
                .map(|&(j, p)| (j, p * z[j] / weight))
                .collect(),
        );
    }
    Ok(pu)
}
