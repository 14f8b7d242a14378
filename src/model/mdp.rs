use log::debug;
use ndarray::Array2;
use rand::Rng;

use crate::error::{Error, Result};
use crate::model::{sample_row, validate_row, ActionDynamicsSource, TransitionRow};

/// A standard MDP over the same partitioned state space as [`Lmdp`]:
/// action-conditioned transition rows, a reward matrix, and a start state.
///
/// [`Lmdp`]: crate::model::Lmdp
#[derive(Debug, Clone)]
pub struct Mdp {
    pub n_states: usize,
    pub n_nonterminal_states: usize,
    pub n_actions: usize,
    /// Transition rows indexed `[nonterminal state][action]`.
    pub p: Vec<Vec<TransitionRow>>,
    /// Rewards of shape `(n_states, n_actions)`.
    pub r: Array2<f64>,
    /// Start state index.
    pub s0: usize,
}

impl Mdp {
    /// Builds an MDP from a dynamics source, validating shapes and rows.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` for shape mismatches or out-of-range
    /// successor indices and `Error::Normalization` for rows that are not
    /// probability distributions.
    pub fn from_source(source: &impl ActionDynamicsSource) -> Result<Self> {
        let n_states = source.n_states();
        let n_nonterminal_states = source.n_nonterminal_states();
        let n_actions = source.n_actions();
        let p = source.action_rows()?;
        let r = source.action_rewards();
        let s0 = source.start_state();

        if p.len() != n_nonterminal_states {
            return Err(Error::structural(format!(
                "{} action-row groups for {n_nonterminal_states} nonterminal states",
                p.len()
            )));
        }
        if r.dim() != (n_states, n_actions) {
            return Err(Error::structural(format!(
                "reward matrix has shape {:?}, expected ({n_states}, {n_actions})",
                r.dim()
            )));
        }
        if s0 >= n_states {
            return Err(Error::structural(format!(
                "start state {s0} out of range for {n_states} states"
            )));
        }
        for (s, per_action) in p.iter().enumerate() {
            if per_action.len() != n_actions {
                return Err(Error::structural(format!(
                    "state {s} has {} action rows, expected {n_actions}",
                    per_action.len()
                )));
            }
            for row in per_action {
                validate_row(row, s)?;
                for &(j, _) in row {
                    if j >= n_states {
                        return Err(Error::structural(format!(
                            "row for state {s} points at out-of-range successor {j}"
                        )));
                    }
                }
            }
        }

        debug!(
            "MDP: {} states ({} nonterminal), {} actions, start {}",
            n_states, n_nonterminal_states, n_actions, s0
        );
        Ok(Mdp {
            n_states,
            n_nonterminal_states,
            n_actions,
            p,
            r,
            s0,
        })
    }

    /// Whether `state` is terminal.
    pub fn terminal(&self, state: usize) -> bool {
        state >= self.n_nonterminal_states
    }

    /// Samples one transition under `action` and returns
    /// `(next_state, reward, done)`; the reward is the state-action entry.
    ///
    /// # Panics
    ///
    /// Panics if `state` is terminal or out of range.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAction` for an action index outside the action
    /// set and `Error::Normalization` if the selected row is not a
    /// probability distribution.
    pub fn act<R: Rng>(
        &self,
        state: usize,
        action: usize,
        rng: &mut R,
    ) -> Result<(usize, f64, bool)> {
        assert!(
            state < self.n_nonterminal_states,
            "act called on terminal or out-of-range state {state}"
        );
        if action >= self.n_actions {
            return Err(Error::InvalidAction {
                action,
                n_actions: self.n_actions,
            });
        }
        let row = &self.p[state][action];
        validate_row(row, state)?;
        let next = sample_row(row, rng);
        Ok((next, self.r[[state, action]], self.terminal(next)))
    }
}
