use log::{debug, trace};
use ndarray::Array1;

use crate::error::{Error, Result};
use crate::model::{Lmdp, TransitionRow};
use crate::solver::SolverConfig;

/// Computes the desirability function `Z` of an LMDP by power iteration on
/// the exponentiated Bellman operator
/// `Z[s] <- exp(R[s]/lambda) * (P0[s] . Z)`.
///
/// Terminal entries are fixed at `exp(R[t]/lambda)` before the first sweep
/// and never touched. Nonterminal entries start at zero, which keeps every
/// iterate a lower bound on the fixed point: the iteration is monotone
/// non-decreasing per state, and nonterminal states that cannot reach a
/// terminal state stay at the degenerate fixed point `Z = 0`.
///
/// Returns `(z, sweeps)`. A model without nonterminal states converges in
/// zero sweeps. Requires `config.lambda > 0` and `config.epsilon > 0`.
///
/// # Errors
///
/// Returns `Error::NonConvergence` carrying the last iterate if the sweep
/// residual is still at or above `config.epsilon` after
/// `config.max_iterations` sweeps.
///
/// # Examples
///
/// ```
/// use lmdp::grid::{GridLayout, GridWorld};
/// use lmdp::model::Lmdp;
/// use lmdp::solver::{power_iteration, SolverConfig};
///
/// let layout = GridLayout::from_map(&[
///     "####",
///     "#A #",
///     "# G#",
///     "####",
/// ])?;
/// let world = GridWorld::new(layout)?;
/// let lmdp = Lmdp::from_source(&world)?;
/// let (z, sweeps) = power_iteration(&lmdp, &SolverConfig::default())?;
/// assert!(sweeps < 50);
/// assert!(z[lmdp.s0] > 0.0 && z[lmdp.s0] < 1.0);
/// # Ok::<(), lmdp::Error>(())
/// ```
pub fn power_iteration(lmdp: &Lmdp, config: &SolverConfig) -> Result<(Array1<f64>, usize)> {
    let n_nonterminal = lmdp.n_nonterminal_states;
    let mut z = lmdp.r.mapv(|r| (r / config.lambda).exp());
    for s in 0..n_nonterminal {
        z[s] = 0.0;
    }
    if n_nonterminal == 0 {
        debug!("power iteration: no nonterminal states, nothing to solve");
        return Ok((z, 0));
    }

    let gain: Vec<f64> = (0..n_nonterminal)
        .map(|s| (lmdp.r[s] / config.lambda).exp())
        .collect();

    let mut residual = f64::INFINITY;
    for iteration in 1..=config.max_iterations {
        let updated = apply_sweep(&lmdp.p0, &gain, &z);
        residual = 0.0;
        for (s, &value) in updated.iter().enumerate() {
            residual = residual.max((value - z[s]).abs());
            z[s] = value;
        }
        if residual < config.epsilon {
            debug!(
                "power iteration converged after {iteration} sweeps (residual {residual:.3e})"
            );
            return Ok((z, iteration));
        }
        if iteration % 1000 == 0 {
            trace!("power iteration sweep {iteration}: residual {residual:.3e}");
        }
    }
    Err(Error::NonConvergence {
        iterations: config.max_iterations,
        residual,
        last: Box::new(z),
    })
}

/// One update pass over the nonterminal states: returns
/// `exp(R[s]/lambda) * (P0[s] . z)` for every nonterminal `s` without
/// modifying `z`.
///
/// [`power_iteration`] applies exactly this map until it stabilizes; tests
/// and callers stepping the operator by hand observe iterates through it.
pub fn sweep(lmdp: &Lmdp, lambda: f64, z: &Array1<f64>) -> Vec<f64> {
    let gain: Vec<f64> = (0..lmdp.n_nonterminal_states)
        .map(|s| (lmdp.r[s] / lambda).exp())
        .collect();
    apply_sweep(&lmdp.p0, &gain, z)
}

#[cfg(not(feature = "parallel"))]
fn apply_sweep(rows: &[TransitionRow], gain: &[f64], z: &Array1<f64>) -> Vec<f64> {
    rows.iter()
        .zip(gain)
        .map(|(row, g)| g * row_dot(row, z))
        .collect()
}

/// Rows are independent and each row product accumulates sequentially, so
/// the parallel sweep matches the serial one bit for bit.
#[cfg(feature = "parallel")]
fn apply_sweep(rows: &[TransitionRow], gain: &[f64], z: &Array1<f64>) -> Vec<f64> {
    use rayon::prelude::*;

    rows.par_iter()
        .zip(gain.par_iter())
        .map(|(row, g)| g * row_dot(row, z))
        .collect()
}

fn row_dot(row: &[(usize, f64)], z: &Array1<f64>) -> f64 {
    row.iter().map(|&(j, p)| p * z[j]).sum()
}
