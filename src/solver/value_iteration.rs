use log::debug;
use ndarray::Array1;

use crate::error::{Error, Result};
use crate::model::Mdp;

/// Solves a standard MDP by value iteration with a frozen terminal
/// boundary.
///
/// Terminal values are pinned to the terminal state's action-0 reward
/// (terminal rewards are action-independent for grid and embedded models);
/// each sweep recomputes only nonterminal states with
/// `V[s] <- max_a (R[s][a] + gamma * P[s][a] . V)` against the previous
/// iterate.
///
/// Returns `(values, greedy_policy, sweeps)`; the greedy policy picks the
/// lowest action index among maximizers for each nonterminal state.
///
/// # Errors
///
/// Returns `Error::NonConvergence` carrying the last iterate if the max
/// per-state change never drops below `epsilon` within `max_iterations`
/// sweeps.
pub fn value_iteration(
    mdp: &Mdp,
    gamma: f64,
    epsilon: f64,
    max_iterations: usize,
) -> Result<(Array1<f64>, Vec<usize>, usize)> {
    let n_nonterminal = mdp.n_nonterminal_states;
    let mut v = Array1::zeros(mdp.n_states);
    for t in n_nonterminal..mdp.n_states {
        v[t] = mdp.r[[t, 0]];
    }
    if n_nonterminal == 0 {
        return Ok((v, Vec::new(), 0));
    }

    let mut residual = f64::INFINITY;
    for iteration in 1..=max_iterations {
        // Fresh vector per sweep; the terminal block carries over untouched.
        let mut next = v.clone();
        residual = 0.0;
        for s in 0..n_nonterminal {
            let best = (0..mdp.n_actions)
                .map(|a| q_value(mdp, s, a, gamma, &v))
                .fold(f64::NEG_INFINITY, f64::max);
            residual = residual.max((best - v[s]).abs());
            next[s] = best;
        }
        v = next;
        if residual < epsilon {
            debug!(
                "value iteration converged after {iteration} sweeps (residual {residual:.3e})"
            );
            let policy = greedy_policy(mdp, gamma, &v);
            return Ok((v, policy, iteration));
        }
    }
    Err(Error::NonConvergence {
        iterations: max_iterations,
        residual,
        last: Box::new(v),
    })
}

fn q_value(mdp: &Mdp, state: usize, action: usize, gamma: f64, v: &Array1<f64>) -> f64 {
    mdp.r[[state, action]]
        + gamma
            * mdp.p[state][action]
                .iter()
                .map(|&(j, p)| p * v[j])
                .sum::<f64>()
}

fn greedy_policy(mdp: &Mdp, gamma: f64, v: &Array1<f64>) -> Vec<usize> {
    (0..mdp.n_nonterminal_states)
        .map(|s| {
            let mut best_action = 0;
            let mut best = f64::NEG_INFINITY;
            for a in 0..mdp.n_actions {
                let q = q_value(mdp, s, a, gamma, v);
                if q > best {
                    best = q;
                    best_action = a;
                }
            }
            best_action
        })
        .collect()
}
