use log::debug;
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};
use crate::grid::{Action, Direction, GridLayout, GridState, StateSpace};
use crate::model::{ActionDynamicsSource, PassiveDynamicsSource, TransitionRow};

/// Rewards attached to grid states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardConfig {
    /// Reward collected at nonterminal states.
    pub step_cost: f64,
    /// Reward collected at terminal states.
    pub terminal_reward: f64,
}

impl RewardConfig {
    /// Unit step cost and zero terminal reward.
    pub fn new() -> Self {
        RewardConfig {
            step_cost: -1.0,
            terminal_reward: 0.0,
        }
    }

    /// Sets the nonterminal step cost.
    pub fn with_step_cost(mut self, step_cost: f64) -> Self {
        self.step_cost = step_cost;
        self
    }

    /// Sets the terminal reward.
    pub fn with_terminal_reward(mut self, terminal_reward: f64) -> Self {
        self.terminal_reward = terminal_reward;
        self
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A grid world over a [`GridLayout`]: deterministic step dynamics plus the
/// passive and action-conditioned transition structure derived from them.
///
/// Implements both dynamics-source seams, so the same world feeds
/// [`Lmdp::from_source`] and [`Mdp::from_source`].
///
/// [`Lmdp::from_source`]: crate::model::Lmdp::from_source
/// [`Mdp::from_source`]: crate::model::Mdp::from_source
#[derive(Debug, Clone)]
pub struct GridWorld {
    layout: GridLayout,
    space: StateSpace,
    reward_config: RewardConfig,
    s0: usize,
}

impl GridWorld {
    /// Builds a world with the default rewards.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` if state enumeration fails its geometry
    /// check.
    pub fn new(layout: GridLayout) -> Result<Self> {
        Self::with_rewards(layout, RewardConfig::default())
    }

    /// Builds a world with explicit rewards.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` if state enumeration fails its geometry
    /// check.
    pub fn with_rewards(layout: GridLayout, reward_config: RewardConfig) -> Result<Self> {
        let space = StateSpace::new(&layout)?;
        let (sx, sy) = layout.start();
        let start = GridState::new(sx, sy, Direction::Right);
        let s0 = space.index_of(&start).ok_or_else(|| {
            Error::structural(format!("start cell ({sx}, {sy}) is not enumerated"))
        })?;
        debug!(
            "grid world: {}x{} interior, start index {}",
            layout.size(),
            layout.size(),
            s0
        );
        Ok(GridWorld {
            layout,
            space,
            reward_config,
            s0,
        })
    }

    /// The wall and goal layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The enumerated state space.
    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    /// The reward configuration.
    pub fn reward_config(&self) -> RewardConfig {
        self.reward_config
    }

    /// Total number of states.
    pub fn n_states(&self) -> usize {
        self.space.len()
    }

    /// Number of nonterminal states.
    pub fn n_nonterminal_states(&self) -> usize {
        self.space.n_nonterminal_states()
    }

    /// Index of the start state (the start cell facing right).
    pub fn start_index(&self) -> usize {
        self.s0
    }

    /// Deterministic one-step transition. Turns rotate the facing in place;
    /// `Forward` moves one cell along the facing when the target cell is
    /// open and stays in place otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not on an open cell.
    pub fn step(&self, state: GridState, action: Action) -> GridState {
        assert!(
            self.layout.is_open(state.x, state.y),
            "step from a cell that is not open: ({}, {})",
            state.x,
            state.y
        );
        match action {
            Action::Left => GridState::new(state.x, state.y, state.dir.turned_left()),
            Action::Right => GridState::new(state.x, state.y, state.dir.turned_right()),
            Action::Forward => {
                let (dx, dy) = state.dir.delta();
                let target = GridState::new(state.x + dx, state.y + dy, state.dir);
                if self.layout.is_open(target.x, target.y) {
                    target
                } else {
                    state
                }
            }
        }
    }

    /// Which action maps the state at `from` to the state at `to`, if any.
    /// Lets a caller replay a `(state, next_state)` pair from the solver
    /// against an external view without handing the solver a mutable
    /// environment.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn action_between(&self, from: usize, to: usize) -> Option<Action> {
        let source = self.space.state(from);
        let target = self.space.state(to);
        Action::ALL
            .into_iter()
            .find(|&action| self.step(source, action) == target)
    }

    fn state_reward(&self, index: usize) -> f64 {
        if self.space.is_terminal(index) {
            self.reward_config.terminal_reward
        } else {
            self.reward_config.step_cost
        }
    }

    fn successor_index(&self, state: GridState, action: Action) -> Result<usize> {
        let next = self.step(state, action);
        self.space.index_of(&next).ok_or_else(|| {
            Error::structural(format!(
                "successor of ({}, {}, {:?}) under {action:?} is not enumerated",
                state.x, state.y, state.dir
            ))
        })
    }
}

impl PassiveDynamicsSource for GridWorld {
    fn n_states(&self) -> usize {
        self.space.len()
    }

    fn n_nonterminal_states(&self) -> usize {
        self.space.n_nonterminal_states()
    }

    fn n_actions(&self) -> usize {
        Action::COUNT
    }

    fn start_state(&self) -> usize {
        self.s0
    }

    /// Uniform mixture of the three deterministic action successors. Row
    /// entries are pushed in action order; a blocked `Forward` merges into
    /// no one (turns always change the facing), so every row keeps exactly
    /// one entry per action.
    fn passive_rows(&self) -> Result<Vec<TransitionRow>> {
        let n = self.space.n_nonterminal_states();
        let weight = 1.0 / Action::COUNT as f64;
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let state = self.space.state(i);
            let mut row: TransitionRow = Vec::with_capacity(Action::COUNT);
            for action in Action::ALL {
                let j = self.successor_index(state, action)?;
                match row.iter_mut().find(|(k, _)| *k == j) {
                    Some((_, p)) => *p += weight,
                    None => row.push((j, weight)),
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn rewards(&self) -> Array1<f64> {
        let mut r = Array1::zeros(self.space.len());
        for s in 0..self.space.len() {
            r[s] = self.state_reward(s);
        }
        r
    }
}

impl ActionDynamicsSource for GridWorld {
    fn n_states(&self) -> usize {
        self.space.len()
    }

    fn n_nonterminal_states(&self) -> usize {
        self.space.n_nonterminal_states()
    }

    fn n_actions(&self) -> usize {
        Action::COUNT
    }

    fn start_state(&self) -> usize {
        self.s0
    }

    /// One-hot rows: each action lands on its deterministic successor.
    fn action_rows(&self) -> Result<Vec<Vec<TransitionRow>>> {
        let n = self.space.n_nonterminal_states();
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let state = self.space.state(i);
            let mut per_action = Vec::with_capacity(Action::COUNT);
            for action in Action::ALL {
                let j = self.successor_index(state, action)?;
                per_action.push(vec![(j, 1.0)]);
            }
            rows.push(per_action);
        }
        Ok(rows)
    }

    fn action_rewards(&self) -> Array2<f64> {
        let mut r = Array2::zeros((self.space.len(), Action::COUNT));
        for s in 0..self.space.len() {
            let reward = self.state_reward(s);
            for a in 0..Action::COUNT {
                r[[s, a]] = reward;
            }
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lmdp, Mdp};
    use approx::assert_abs_diff_eq;

    fn open_two_by_two() -> GridWorld {
        let layout = GridLayout::new(2, vec![], vec![(2, 2)]).unwrap();
        GridWorld::new(layout).unwrap()
    }

    #[test]
    fn test_step_turns_in_place() {
        let world = open_two_by_two();
        let state = GridState::new(1, 1, Direction::Right);
        assert_eq!(
            world.step(state, Action::Left),
            GridState::new(1, 1, Direction::Up)
        );
        assert_eq!(
            world.step(state, Action::Right),
            GridState::new(1, 1, Direction::Down)
        );
    }

    #[test]
    fn test_step_forward_moves_and_blocks() {
        let world = open_two_by_two();
        assert_eq!(
            world.step(GridState::new(1, 1, Direction::Right), Action::Forward),
            GridState::new(2, 1, Direction::Right)
        );
        // Up from the top row runs into the boundary ring.
        let blocked = GridState::new(1, 1, Direction::Up);
        assert_eq!(world.step(blocked, Action::Forward), blocked);
    }

    #[test]
    fn test_step_forward_blocked_by_wall() {
        let layout = GridLayout::new(3, vec![(2, 2)], vec![(3, 3)]).unwrap();
        let world = GridWorld::new(layout).unwrap();
        let facing_wall = GridState::new(1, 2, Direction::Right);
        assert_eq!(world.step(facing_wall, Action::Forward), facing_wall);
    }

    #[test]
    #[should_panic(expected = "not open")]
    fn test_step_from_wall_cell_panics() {
        let layout = GridLayout::new(3, vec![(2, 2)], vec![(3, 3)]).unwrap();
        let world = GridWorld::new(layout).unwrap();
        world.step(GridState::new(2, 2, Direction::Right), Action::Forward);
    }

    #[test]
    fn test_start_index_defaults_to_first_state() {
        let world = open_two_by_two();
        assert_eq!(world.start_index(), 0);
        assert_eq!(
            world.state_space().state(0),
            GridState::new(1, 1, Direction::Right)
        );
    }

    #[test]
    fn test_start_index_follows_layout_start() {
        let layout = GridLayout::new(2, vec![], vec![(2, 2)])
            .unwrap()
            .with_start(1, 2)
            .unwrap();
        let world = GridWorld::new(layout).unwrap();
        let start = world.state_space().state(world.start_index());
        assert_eq!(start, GridState::new(1, 2, Direction::Right));
    }

    #[test]
    fn test_passive_rows_are_uniform_in_action_order() {
        let world = open_two_by_two();
        let rows = world.passive_rows().unwrap();
        assert_eq!(rows.len(), world.n_nonterminal_states());
        for (i, row) in rows.iter().enumerate() {
            // Turns always change the facing, so the three successors are
            // distinct even when forward is blocked.
            assert_eq!(row.len(), Action::COUNT);
            assert_abs_diff_eq!(
                row.iter().map(|&(_, p)| p).sum::<f64>(),
                1.0,
                epsilon = 1e-9
            );
            let state = world.state_space().state(i);
            for (k, action) in Action::ALL.into_iter().enumerate() {
                let expected = world.step(state, action);
                assert_eq!(world.state_space().state(row[k].0), expected);
                assert_abs_diff_eq!(row[k].1, 1.0 / 3.0);
            }
        }
    }

    #[test]
    fn test_rewards_split_on_the_partition() {
        let world = open_two_by_two();
        let r = PassiveDynamicsSource::rewards(&world);
        let n_non = world.n_nonterminal_states();
        for s in 0..world.n_states() {
            let expected = if s < n_non { -1.0 } else { 0.0 };
            assert_eq!(r[s], expected);
        }
    }

    #[test]
    fn test_custom_reward_config() {
        let layout = GridLayout::new(2, vec![], vec![(2, 2)]).unwrap();
        let rewards = RewardConfig::new()
            .with_step_cost(-0.5)
            .with_terminal_reward(2.0);
        let world = GridWorld::with_rewards(layout, rewards).unwrap();
        assert_eq!(world.reward_config().step_cost, -0.5);
        assert_eq!(world.reward_config().terminal_reward, 2.0);
        let r = PassiveDynamicsSource::rewards(&world);
        assert_eq!(r[0], -0.5);
        assert_eq!(r[world.n_states() - 1], 2.0);
    }

    #[test]
    fn test_layout_view_reconstructs_the_map() {
        let lines = ["#####", "#A  #", "# # #", "#  G#", "#####"];
        let world = GridWorld::new(GridLayout::from_map(&lines).unwrap()).unwrap();
        let layout = world.layout();
        let side = layout.size() as i32 + 2;
        let mut rendered = Vec::new();
        for y in 0..side {
            let mut row = String::new();
            for x in 0..side {
                row.push(if !layout.is_open(x, y) {
                    '#'
                } else if layout.is_goal(x, y) {
                    'G'
                } else if (x, y) == layout.start() {
                    'A'
                } else {
                    ' '
                });
            }
            rendered.push(row);
        }
        assert_eq!(rendered, lines);
    }

    #[test]
    fn test_action_rows_are_one_hot() {
        let world = open_two_by_two();
        let rows = world.action_rows().unwrap();
        assert_eq!(rows.len(), world.n_nonterminal_states());
        for (i, per_action) in rows.iter().enumerate() {
            assert_eq!(per_action.len(), Action::COUNT);
            let state = world.state_space().state(i);
            for (a, row) in per_action.iter().enumerate() {
                assert_eq!(row.len(), 1);
                assert_eq!(row[0].1, 1.0);
                let expected = world.step(state, Action::ALL[a]);
                assert_eq!(world.state_space().state(row[0].0), expected);
            }
        }
    }

    #[test]
    fn test_action_rewards_copy_the_state_reward() {
        let world = open_two_by_two();
        let r = world.action_rewards();
        assert_eq!(r.dim(), (16, 3));
        for s in 0..world.n_states() {
            for a in 0..Action::COUNT {
                let expected = if s < world.n_nonterminal_states() {
                    -1.0
                } else {
                    0.0
                };
                assert_eq!(r[[s, a]], expected);
            }
        }
    }

    #[test]
    fn test_world_feeds_both_models() {
        let world = open_two_by_two();
        let lmdp = Lmdp::from_source(&world).unwrap();
        let mdp = Mdp::from_source(&world).unwrap();
        assert_eq!(lmdp.n_states, mdp.n_states);
        assert_eq!(lmdp.n_nonterminal_states, mdp.n_nonterminal_states);
        assert_eq!(lmdp.n_actions, 3);
        assert_eq!(mdp.n_actions, 3);
        assert_eq!(lmdp.s0, mdp.s0);
    }

    #[test]
    fn test_action_between_recovers_each_action() {
        let world = open_two_by_two();
        let space = world.state_space();
        let from = space
            .index_of(&GridState::new(1, 1, Direction::Right))
            .unwrap();
        for action in Action::ALL {
            let next = world.step(space.state(from), action);
            let to = space.index_of(&next).unwrap();
            assert_eq!(world.action_between(from, to), Some(action));
        }
    }

    #[test]
    fn test_action_between_unrelated_states() {
        let world = open_two_by_two();
        let space = world.state_space();
        let from = space
            .index_of(&GridState::new(1, 1, Direction::Right))
            .unwrap();
        let far = space
            .index_of(&GridState::new(1, 2, Direction::Left))
            .unwrap();
        assert_eq!(world.action_between(from, far), None);
        // A self-loop is only reachable when forward is blocked.
        assert_eq!(world.action_between(from, from), None);
        let blocked = space.index_of(&GridState::new(1, 1, Direction::Up)).unwrap();
        assert_eq!(
            world.action_between(blocked, blocked),
            Some(Action::Forward)
        );
    }
}
