//! Grid-world state domain: layouts, state enumeration, and step dynamics.

pub mod layout;
pub mod state_space;
pub mod world;

pub use layout::GridLayout;
pub use state_space::StateSpace;
pub use world::{GridWorld, RewardConfig};

use crate::error::Error;

/// Number of orientations an agent can face.
pub const N_ORIENTATIONS: usize = 4;

/// The fixed discrete action set: turn left, turn right, move forward.
///
/// The numeric order is significant: transition-row entries are laid out in
/// this order by the builders, and the policy embedding rotates row values
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Left = 0,
    Right = 1,
    Forward = 2,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Action; 3] = [Action::Left, Action::Right, Action::Forward];

    /// Number of discrete actions.
    pub const COUNT: usize = Action::ALL.len();

    /// The numeric index of this action.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Left),
            1 => Ok(Action::Right),
            2 => Ok(Action::Forward),
            _ => Err(Error::InvalidAction {
                action: value,
                n_actions: Action::COUNT,
            }),
        }
    }
}

/// Agent facing, enumerated clockwise starting from positive x.
///
/// `y` grows downward, so `Down` is the positive-y facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    /// All facings in enumeration order.
    pub const ALL: [Direction; N_ORIENTATIONS] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// The numeric index of this facing.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit movement delta `(dx, dy)` for this facing.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    /// Facing after a quarter turn counter-clockwise.
    pub fn turned_left(self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Down => Direction::Right,
            Direction::Left => Direction::Down,
            Direction::Up => Direction::Left,
        }
    }

    /// Facing after a quarter turn clockwise.
    pub fn turned_right(self) -> Self {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }
}

/// A grid state: interior cell coordinates plus the agent's facing.
///
/// Coordinates are 1-based; the surrounding boundary wall occupies row and
/// column 0 and `size + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridState {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

impl GridState {
    /// Creates a state at `(x, y)` facing `dir`.
    pub fn new(x: i32, y: i32, dir: Direction) -> Self {
        GridState { x, y, dir }
    }
}
