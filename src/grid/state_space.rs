use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::grid::{Direction, GridLayout, GridState, N_ORIENTATIONS};

/// Ordered enumeration of every grid state with a stable nonterminal-first
/// partition.
///
/// States on goal cells are terminal. All nonterminal states occupy indices
/// `0..n_nonterminal_states()` and all terminal states follow, preserving the
/// scan order within each class, so the terminal test on an index is a single
/// comparison.
#[derive(Debug, Clone)]
pub struct StateSpace {
    states: Vec<GridState>,
    index: HashMap<GridState, usize>,
    n_nonterminal: usize,
}

impl StateSpace {
    /// Enumerates the open cells of `layout` in x-major scan order with all
    /// four facings per cell.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` if the enumerated state count disagrees
    /// with the grid geometry (`4 * (size^2 - n_walls)`).
    pub fn new(layout: &GridLayout) -> Result<Self> {
        let size = layout.size() as i32;
        let mut nonterminal = Vec::new();
        let mut terminal = Vec::new();
        for x in 1..=size {
            for y in 1..=size {
                if !layout.is_open(x, y) {
                    continue;
                }
                for dir in Direction::ALL {
                    let state = GridState::new(x, y, dir);
                    if layout.is_goal(x, y) {
                        terminal.push(state);
                    } else {
                        nonterminal.push(state);
                    }
                }
            }
        }

        let expected = N_ORIENTATIONS * (layout.size() * layout.size() - layout.n_walls());
        let n_states = nonterminal.len() + terminal.len();
        if n_states != expected {
            return Err(Error::structural(format!(
                "enumerated {n_states} states, expected {expected} from the grid geometry"
            )));
        }

        let n_nonterminal = nonterminal.len();
        let mut states = nonterminal;
        states.append(&mut terminal);
        let index = states
            .iter()
            .enumerate()
            .map(|(i, &state)| (state, i))
            .collect();
        debug!(
            "state space: {} states over {} cells ({} nonterminal, {} terminal)",
            n_states,
            n_states / N_ORIENTATIONS,
            n_nonterminal,
            n_states - n_nonterminal
        );
        Ok(StateSpace {
            states,
            index,
            n_nonterminal,
        })
    }

    /// Total number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the space has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of nonterminal states; also the index of the first terminal
    /// state.
    pub fn n_nonterminal_states(&self) -> usize {
        self.n_nonterminal
    }

    /// Number of terminal states.
    pub fn n_terminal_states(&self) -> usize {
        self.states.len() - self.n_nonterminal
    }

    /// Number of open cells.
    pub fn n_cells(&self) -> usize {
        self.states.len() / N_ORIENTATIONS
    }

    /// The state at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn state(&self, index: usize) -> GridState {
        self.states[index]
    }

    /// The index of `state`, if it is part of the space.
    pub fn index_of(&self, state: &GridState) -> Option<usize> {
        self.index.get(state).copied()
    }

    /// Whether the state at `index` is terminal.
    pub fn is_terminal(&self, index: usize) -> bool {
        index >= self.n_nonterminal
    }

    /// All states in index order.
    pub fn states(&self) -> &[GridState] {
        &self.states
    }
}
