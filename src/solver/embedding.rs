use log::debug;
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::model::{Lmdp, Mdp, TransitionRow};
use crate::solver::{optimal_policy, power_iteration, SolverConfig};

/// Builds a standard MDP equivalent to a solved LMDP.
///
/// Action 0 reproduces the optimal controlled row `Pu[s]` exactly; action
/// `a` receives the same row with its probability values cyclically rotated
/// by `a` positions across the successor list, and rewards copy the LMDP's
/// state reward into every action column. Rotation permutes values over an
/// unchanged support, so every `P[s][a]` stays a distribution, and greedy
/// behavior in the embedded MDP recovers the LMDP's optimal policy through
/// action 0.
///
/// The successor list is keyed by the geometric action order the builder
/// fixed (left turn, right turn, forward), so rotating by `a` deflects each
/// action's probability mass onto the successor reached `a` actions later
/// in that order, uniformly across states.
///
/// # Errors
///
/// Returns `Error::Structural` if `pu` does not hold one row per
/// nonterminal state and `Error::Normalization` if a row is empty.
pub fn embed_policy(lmdp: &Lmdp, pu: &[TransitionRow]) -> Result<Mdp> {
    if pu.len() != lmdp.n_nonterminal_states {
        return Err(Error::structural(format!(
            "{} policy rows for {} nonterminal states",
            pu.len(),
            lmdp.n_nonterminal_states
        )));
    }
    let n_actions = lmdp.n_actions;
    let mut p = Vec::with_capacity(pu.len());
    for (s, row) in pu.iter().enumerate() {
        if row.is_empty() {
            return Err(Error::normalization(format!(
                "policy row for state {s} is empty"
            )));
        }
        let per_action: Vec<TransitionRow> = (0..n_actions).map(|a| rotated_row(row, a)).collect();
        p.push(per_action);
    }
    let mut r = Array2::zeros((lmdp.n_states, n_actions));
    for s in 0..lmdp.n_states {
        for a in 0..n_actions {
            r[[s, a]] = lmdp.r[s];
        }
    }
    debug!(
        "embedded LMDP into an MDP with {n_actions} actions over {} states",
        lmdp.n_states
    );
    Ok(Mdp {
        n_states: lmdp.n_states,
        n_nonterminal_states: lmdp.n_nonterminal_states,
        n_actions,
        p,
        r,
        s0: lmdp.s0,
    })
}

/// Solves the LMDP and embeds its optimal policy: power iteration, tilting,
/// then [`embed_policy`].
///
/// # Errors
///
/// Propagates solver and extraction failures unchanged.
///
/// # Examples
///
/// ```
/// use lmdp::grid::{GridLayout, GridWorld};
/// use lmdp::model::Lmdp;
/// use lmdp::solver::{embed_lmdp, SolverConfig};
///
/// let layout = GridLayout::from_map(&[
///     "####",
///     "#A #",
///     "# G#",
///     "####",
/// ])?;
/// let world = GridWorld::new(layout)?;
/// let lmdp = Lmdp::from_source(&world)?;
/// let mdp = embed_lmdp(&lmdp, &SolverConfig::default())?;
/// assert_eq!(mdp.n_actions, 3);
/// assert_eq!(mdp.r[[0, 0]], lmdp.r[0]);
/// # Ok::<(), lmdp::Error>(())
/// ```
pub fn embed_lmdp(lmdp: &Lmdp, config: &SolverConfig) -> Result<Mdp> {
    let (z, _) = power_iteration(lmdp, config)?;
    let pu = optimal_policy(lmdp, &z)?;
    embed_policy(lmdp, &pu)
}

/// Rotates the probability values of `row` forward by `shift` positions
/// while the successor indices stay in place.
fn rotated_row(row: &[(usize, f64)], shift: usize) -> TransitionRow {
    let m = row.len();
    let shift = shift % m;
    (0..m)
        .map(|k| (row[k].0, row[(k + m - shift) % m].1))
        .collect()
}
