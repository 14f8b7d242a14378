//! Linearly-solvable MDPs over grid worlds: state-space construction,
//! power-iteration solving, optimal-policy extraction, and embedding into
//! equivalent standard MDPs.

pub mod error;
pub mod grid;
pub mod model;
pub mod solver;

pub use error::{Error, Result};
pub use grid::{Action, Direction, GridLayout, GridState, GridWorld, RewardConfig, StateSpace};
pub use model::{ActionDynamicsSource, Lmdp, Mdp, PassiveDynamicsSource, TransitionRow};
pub use solver::{
    embed_lmdp, embed_policy, optimal_policy, power_iteration, sweep, value_function,
    value_iteration, SolverConfig,
};
