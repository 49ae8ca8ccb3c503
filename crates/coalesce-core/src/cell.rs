//! Grid cell coordinates and cardinal moves.

use std::fmt;

/// A grid coordinate `(row, col)`.
///
/// Cells are plain values: equality, hashing, and ordering are by value,
/// with ordering row-major so sorted cell lists read top-left to
/// bottom-right. Coordinates are signed so that shifting a border cell off
/// the board yields a representable (and out-of-bounds) cell rather than
/// wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index, growing downwards.
    pub row: i32,
    /// Column index, growing rightwards.
    pub col: i32,
}

impl Cell {
    /// Create a cell at `(row, col)`.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The cell one step away in direction `mv`. No bounds checking.
    pub fn shifted(self, mv: Move) -> Self {
        let (dr, dc) = mv.offset();
        Self::new(self.row + dr, self.col + dc)
    }

    /// The four cardinal neighbours in [`Move::ALL`] order, unfiltered.
    pub fn cardinal(self) -> [Cell; 4] {
        Move::ALL.map(|mv| self.shifted(mv))
    }

    /// Manhattan (L1) distance to `other`.
    pub fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One synchronized cardinal step applied to every agent. Each move costs 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Move {
    /// Row - 1.
    Up = 0,
    /// Row + 1.
    Down = 1,
    /// Col - 1.
    Left = 2,
    /// Col + 1.
    Right = 3,
}

impl Move {
    /// All four moves, in expansion order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Returns the `(row_offset, col_offset)` for this move.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    /// The move that undoes this one on an open board.
    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}
