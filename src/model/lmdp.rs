use log::debug;
use ndarray::Array1;
use rand::Rng;

use crate::error::{Error, Result};
use crate::model::{sample_row, validate_row, PassiveDynamicsSource, TransitionRow};

/// A linearly-solvable MDP: passive dynamics `P0` over a partitioned state
/// space, per-state rewards, and a start state.
///
/// `p0` holds one sparse row per nonterminal state. Terminal states carry a
/// reward but no row; they absorb. Fields are public for direct
/// construction in tests and custom models; [`Lmdp::from_source`] is the
/// validating path.
#[derive(Debug, Clone)]
pub struct Lmdp {
    pub n_states: usize,
    pub n_nonterminal_states: usize,
    /// Number of actions mixed into each passive row; row entries stay in
    /// action order.
    pub n_actions: usize,
    /// Passive transition rows, one per nonterminal state.
    pub p0: Vec<TransitionRow>,
    /// Per-state rewards; terminal entries hold the terminal reward.
    pub r: Array1<f64>,
    /// Start state index.
    pub s0: usize,
}

impl Lmdp {
    /// Builds an LMDP from a dynamics source, validating shapes and rows.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` for shape mismatches or out-of-range
    /// successor indices and `Error::Normalization` for rows that are not
    /// probability distributions.
    pub fn from_source(source: &impl PassiveDynamicsSource) -> Result<Self> {
        let n_states = source.n_states();
        let n_nonterminal_states = source.n_nonterminal_states();
        let p0 = source.passive_rows()?;
        let r = source.rewards();
        let s0 = source.start_state();

        if p0.len() != n_nonterminal_states {
            return Err(Error::structural(format!(
                "{} passive rows for {n_nonterminal_states} nonterminal states",
                p0.len()
            )));
        }
        if r.len() != n_states {
            return Err(Error::structural(format!(
                "reward vector has {} entries for {n_states} states",
                r.len()
            )));
        }
        if s0 >= n_states {
            return Err(Error::structural(format!(
                "start state {s0} out of range for {n_states} states"
            )));
        }
        for (s, row) in p0.iter().enumerate() {
            validate_row(row, s)?;
            for &(j, _) in row {
                if j >= n_states {
                    return Err(Error::structural(format!(
                        "row {s} points at out-of-range successor {j}"
                    )));
                }
            }
        }

        debug!(
            "LMDP: {} states ({} nonterminal), {} actions, start {}",
            n_states,
            n_nonterminal_states,
            source.n_actions(),
            s0
        );
        Ok(Lmdp {
            n_states,
            n_nonterminal_states,
            n_actions: source.n_actions(),
            p0,
            r,
            s0,
        })
    }

    /// Whether `state` is terminal.
    pub fn terminal(&self, state: usize) -> bool {
        state >= self.n_nonterminal_states
    }

    /// Samples one transition from `rows[state]` and returns
    /// `(next_state, reward, done)`; the reward is collected at the
    /// successor. Pass `&self.p0` to walk the passive dynamics, or an
    /// optimal-policy row set to walk the controlled ones.
    ///
    /// # Panics
    ///
    /// Panics if `state` is terminal or out of range for `rows`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Normalization` if `rows[state]` is not a probability
    /// distribution.
    pub fn act<R: Rng>(
        &self,
        state: usize,
        rows: &[TransitionRow],
        rng: &mut R,
    ) -> Result<(usize, f64, bool)> {
        assert!(
            state < self.n_nonterminal_states,
            "act called on terminal or out-of-range state {state}"
        );
        let row = &rows[state];
        validate_row(row, state)?;
        let next = sample_row(row, rng);
        Ok((next, self.r[next], self.terminal(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// Two nonterminal states feeding one terminal state.
    fn chain() -> Lmdp {
        Lmdp {
            n_states: 3,
            n_nonterminal_states: 2,
            n_actions: 2,
            p0: vec![vec![(0, 0.5), (1, 0.5)], vec![(0, 0.5), (2, 0.5)]],
            r: Array1::from_vec(vec![-1.0, -1.0, 0.0]),
            s0: 0,
        }
    }

    #[test]
    fn test_terminal_partition() {
        let lmdp = chain();
        assert!(!lmdp.terminal(0));
        assert!(!lmdp.terminal(1));
        assert!(lmdp.terminal(2));
    }

    #[test]
    fn test_act_walks_the_row_support() {
        let lmdp = chain();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for _ in 0..64 {
            let (next, reward, done) = lmdp.act(1, &lmdp.p0, &mut rng).unwrap();
            assert!(next == 0 || next == 2);
            assert_eq!(reward, lmdp.r[next]);
            assert_eq!(done, next == 2);
        }
    }

    #[test]
    fn test_act_is_deterministic_under_seed() {
        let lmdp = chain();
        let mut a = ChaCha20Rng::seed_from_u64(11);
        let mut b = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..32 {
            assert_eq!(
                lmdp.act(0, &lmdp.p0, &mut a).unwrap(),
                lmdp.act(0, &lmdp.p0, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_act_rejects_unnormalized_rows() {
        let lmdp = chain();
        let bad: Vec<TransitionRow> = vec![vec![(0, 0.3), (1, 0.3)], vec![(2, 1.0)]];
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            lmdp.act(0, &bad, &mut rng),
            Err(Error::Normalization(_))
        ));
    }

    #[test]
    #[should_panic(expected = "terminal or out-of-range")]
    fn test_act_panics_on_terminal_state() {
        let lmdp = chain();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let _ = lmdp.act(2, &lmdp.p0, &mut rng);
    }

    #[test]
    fn test_from_source_rejects_bad_shapes() {
        struct Broken;
        impl PassiveDynamicsSource for Broken {
            fn n_states(&self) -> usize {
                3
            }
            fn n_nonterminal_states(&self) -> usize {
                2
            }
            fn n_actions(&self) -> usize {
                2
            }
            fn start_state(&self) -> usize {
                0
            }
            fn passive_rows(&self) -> Result<Vec<TransitionRow>> {
                // One row short.
                Ok(vec![vec![(2, 1.0)]])
            }
            fn rewards(&self) -> Array1<f64> {
                Array1::zeros(3)
            }
        }
        assert!(matches!(
            Lmdp::from_source(&Broken),
            Err(Error::Structural(_))
        ));
    }
}
