use std::collections::HashSet;

use crate::error::{Error, Result};

/// Wall and goal layout of a square grid interior surrounded by a boundary
/// wall ring.
///
/// Interior cells use 1-based coordinates `1..=size`; the boundary ring is
/// implicit and never enumerated.
#[derive(Debug, Clone)]
pub struct GridLayout {
    size: usize,
    walls: HashSet<(i32, i32)>,
    goals: HashSet<(i32, i32)>,
    start: (i32, i32),
}

impl GridLayout {
    /// Creates a layout with the given interior walls and goal cells and the
    /// start at `(1, 1)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` for out-of-bounds or duplicate walls,
    /// goals colliding with walls, or a start cell that is not open.
    pub fn new(size: usize, walls: Vec<(i32, i32)>, goals: Vec<(i32, i32)>) -> Result<Self> {
        Self::build(size, walls, goals, (1, 1))
    }

    /// Returns the layout with a different start cell.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` if the start cell is out of bounds or on
    /// a wall.
    pub fn with_start(self, x: i32, y: i32) -> Result<Self> {
        Self::build(
            self.size,
            self.walls.into_iter().collect(),
            self.goals.into_iter().collect(),
            (x, y),
        )
    }

    /// Parses an ASCII map: `#` or `W` wall, `G` goal, `A` start, space for
    /// floor.
    ///
    /// The map includes the boundary ring, so a `size x size` interior takes
    /// `size + 2` rows of `size + 2` characters each. Column index is `x` and
    /// row index is `y`. Without an `A` cell the start defaults to `(1, 1)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structural` for non-square or ragged maps, non-wall
    /// boundary cells, unknown characters, or multiple `A` cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use lmdp::grid::GridLayout;
    ///
    /// let layout = GridLayout::from_map(&[
    ///     "####",
    ///     "#AW#",
    ///     "# G#",
    ///     "####",
    /// ])?;
    /// assert_eq!(layout.size(), 2);
    /// assert!(!layout.is_open(2, 1));
    /// assert!(layout.is_goal(2, 2));
    /// # Ok::<(), lmdp::Error>(())
    /// ```
    pub fn from_map(lines: &[&str]) -> Result<Self> {
        let rows = lines.len();
        if rows < 3 {
            return Err(Error::structural(
                "map needs at least 3 rows including the boundary",
            ));
        }
        let mut walls = Vec::new();
        let mut goals = Vec::new();
        let mut start = None;
        for (row, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != rows {
                return Err(Error::structural(format!(
                    "map row {row} has {} columns, expected {rows}",
                    chars.len()
                )));
            }
            for (col, ch) in chars.iter().enumerate() {
                let boundary = row == 0 || row == rows - 1 || col == 0 || col == rows - 1;
                let cell = (col as i32, row as i32);
                match *ch {
                    '#' | 'W' => {
                        if !boundary {
                            walls.push(cell);
                        }
                    }
                    ' ' | 'G' | 'A' if boundary => {
                        return Err(Error::structural(format!(
                            "map boundary must be walls, found '{ch}' at ({col}, {row})"
                        )));
                    }
                    ' ' => {}
                    'G' => goals.push(cell),
                    'A' => {
                        if start.replace(cell).is_some() {
                            return Err(Error::structural("map has more than one start cell"));
                        }
                    }
                    _ => {
                        return Err(Error::structural(format!(
                            "unknown map character '{ch}' at ({col}, {row})"
                        )));
                    }
                }
            }
        }
        Self::build(rows - 2, walls, goals, start.unwrap_or((1, 1)))
    }

    fn build(
        size: usize,
        walls: Vec<(i32, i32)>,
        goals: Vec<(i32, i32)>,
        start: (i32, i32),
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::structural("grid interior must be at least 1x1"));
        }
        let mut wall_set = HashSet::with_capacity(walls.len());
        for (x, y) in walls {
            if !in_bounds(size, x, y) {
                return Err(Error::structural(format!(
                    "wall ({x}, {y}) out of bounds for a {size}x{size} interior"
                )));
            }
            if !wall_set.insert((x, y)) {
                return Err(Error::structural(format!("duplicate wall at ({x}, {y})")));
            }
        }
        let mut goal_set = HashSet::with_capacity(goals.len());
        for (x, y) in goals {
            if !in_bounds(size, x, y) {
                return Err(Error::structural(format!(
                    "goal ({x}, {y}) out of bounds for a {size}x{size} interior"
                )));
            }
            if wall_set.contains(&(x, y)) {
                return Err(Error::structural(format!(
                    "goal ({x}, {y}) collides with a wall"
                )));
            }
            if !goal_set.insert((x, y)) {
                return Err(Error::structural(format!("duplicate goal at ({x}, {y})")));
            }
        }
        let (sx, sy) = start;
        if !in_bounds(size, sx, sy) || wall_set.contains(&start) {
            return Err(Error::structural(format!(
                "start ({sx}, {sy}) is not an open cell"
            )));
        }
        Ok(GridLayout {
            size,
            walls: wall_set,
            goals: goal_set,
            start,
        })
    }

    /// Interior side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The start cell.
    pub fn start(&self) -> (i32, i32) {
        self.start
    }

    /// Number of interior wall cells.
    pub fn n_walls(&self) -> usize {
        self.walls.len()
    }

    /// Whether `(x, y)` is an interior cell that can be occupied.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        in_bounds(self.size, x, y) && !self.walls.contains(&(x, y))
    }

    /// Whether `(x, y)` is a goal cell.
    pub fn is_goal(&self, x: i32, y: i32) -> bool {
        self.goals.contains(&(x, y))
    }
}

fn in_bounds(size: usize, x: i32, y: i32) -> bool {
    x >= 1 && y >= 1 && x <= size as i32 && y <= size as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_and_exposes_cells() {
        let layout = GridLayout::new(3, vec![(2, 2)], vec![(3, 3)]).unwrap();
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.start(), (1, 1));
        assert_eq!(layout.n_walls(), 1);
        assert!(layout.is_open(1, 1));
        assert!(!layout.is_open(2, 2));
        assert!(!layout.is_open(0, 1));
        assert!(!layout.is_open(4, 1));
        assert!(layout.is_goal(3, 3));
        assert!(!layout.is_goal(1, 1));
    }

    #[test]
    fn test_wall_out_of_bounds() {
        let err = GridLayout::new(3, vec![(4, 1)], vec![]).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_duplicate_wall() {
        let err = GridLayout::new(3, vec![(2, 2), (2, 2)], vec![]).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_goal_on_wall() {
        let err = GridLayout::new(3, vec![(2, 2)], vec![(2, 2)]).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_start_on_wall() {
        let err = GridLayout::new(3, vec![(1, 1)], vec![]).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_with_start_moves_and_validates() {
        let layout = GridLayout::new(3, vec![(2, 2)], vec![(3, 3)]).unwrap();
        let layout = layout.with_start(3, 1).unwrap();
        assert_eq!(layout.start(), (3, 1));
        assert!(matches!(
            layout.with_start(2, 2),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn test_start_on_goal_is_allowed() {
        let layout = GridLayout::new(1, vec![], vec![(1, 1)]).unwrap();
        assert_eq!(layout.start(), (1, 1));
        assert!(layout.is_goal(1, 1));
    }

    #[test]
    fn test_from_map_parses_cells() {
        let layout = GridLayout::from_map(&[
            "#####", //
            "#A  #",
            "# W #",
            "#  G#",
            "#####",
        ])
        .unwrap();
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.start(), (1, 1));
        assert_eq!(layout.n_walls(), 1);
        assert!(!layout.is_open(2, 2));
        assert!(layout.is_goal(3, 3));
    }

    #[test]
    fn test_from_map_start_cell() {
        let layout = GridLayout::from_map(&[
            "####", //
            "# A#",
            "#G #",
            "####",
        ])
        .unwrap();
        assert_eq!(layout.start(), (2, 1));
        assert!(layout.is_goal(1, 2));
    }

    #[test]
    fn test_from_map_default_start() {
        let layout = GridLayout::from_map(&[
            "####", //
            "#  #",
            "# G#",
            "####",
        ])
        .unwrap();
        assert_eq!(layout.start(), (1, 1));
    }

    #[test]
    fn test_from_map_ragged_rows() {
        let err = GridLayout::from_map(&[
            "####", //
            "#  ##",
            "# G#",
            "####",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_from_map_unknown_character() {
        let err = GridLayout::from_map(&[
            "####", //
            "#L #",
            "# G#",
            "####",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_from_map_multiple_starts() {
        let err = GridLayout::from_map(&[
            "####", //
            "#AA#",
            "# G#",
            "####",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_from_map_open_boundary() {
        let err = GridLayout::from_map(&[
            "### ", //
            "#  #",
            "# G#",
            "####",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_from_map_too_small() {
        let err = GridLayout::from_map(&["##", "##"]).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }
}
