//! Rectangular open/closed board with 4-connected neighbourhood.

use std::collections::VecDeque;
use std::fmt;

use coalesce_core::{Cell, ConfigError};
use smallvec::SmallVec;

/// Traversability of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellStatus {
    /// Traversable.
    Open,
    /// Wall.
    Closed,
}

impl CellStatus {
    /// Feature value used by [`Grid::encode_occupancy`]: `-1` for walls,
    /// `0` for open cells.
    pub fn feature(self) -> f64 {
        match self {
            CellStatus::Open => 0.0,
            CellStatus::Closed => -1.0,
        }
    }
}

/// An immutable rectangular board.
///
/// Each cell has coordinate `(row, col)` where `0 <= row < rows` and
/// `0 <= col < cols`. Cells outside the board are reported as
/// [`CellStatus::Closed`], so agents treat the border like a wall.
///
/// # Examples
///
/// ```
/// use coalesce_core::Cell;
/// use coalesce_space::Grid;
///
/// let grid = Grid::parse("..#\n...\n#..").unwrap();
/// assert_eq!(grid.open_count(), 7);
/// assert!(grid.is_closed(Cell::new(0, 2)));
/// assert!(grid.is_closed(Cell::new(-1, 0)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<CellStatus>,
}

impl Grid {
    /// Largest accepted dimension: coordinates are `i32`.
    pub const MAX_DIM: usize = i32::MAX as usize;

    /// Build a grid from row-major statuses.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `cells.len() != rows * cols`, if there are no open
    /// cells, or if the open cells do not form a single connected region.
    pub fn from_statuses(
        rows: usize,
        cols: usize,
        cells: Vec<CellStatus>,
    ) -> Result<Self, ConfigError> {
        if rows > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        if cols > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        if cells.len() != rows * cols {
            return Err(ConfigError::RaggedGrid {
                row: rows,
                expected: rows * cols,
                found: cells.len(),
            });
        }
        let grid = Self {
            rows: rows as u32,
            cols: cols as u32,
            cells,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Build a grid from nested rows where `true` marks an open cell.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RaggedGrid`] if rows differ in length, plus
    /// everything [`from_statuses`](Self::from_statuses) rejects.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, ConfigError> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut cells = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ConfigError::RaggedGrid {
                    row: i,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend(row.iter().map(|&open| {
                if open {
                    CellStatus::Open
                } else {
                    CellStatus::Closed
                }
            }));
        }
        Self::from_statuses(rows.len(), width, cells)
    }

    /// Parse a textual board: `.` is open, `#` is closed, one row per line.
    /// Leading and trailing blank lines and surrounding whitespace on each
    /// line are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGridChar`] for any other character,
    /// plus everything [`from_rows`](Self::from_rows) rejects.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for (r, line) in text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let mut row = Vec::with_capacity(line.len());
            for (c, ch) in line.chars().enumerate() {
                match ch {
                    '.' => row.push(true),
                    '#' => row.push(false),
                    other => {
                        return Err(ConfigError::InvalidGridChar {
                            row: r,
                            col: c,
                            ch: other,
                        })
                    }
                }
            }
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// A `rows x cols` board with no walls.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoOpenCells`] if either dimension is zero.
    pub fn open(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        Self::from_statuses(rows, cols, vec![CellStatus::Open; rows * cols])
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let open = self.open_count();
        if open == 0 {
            return Err(ConfigError::NoOpenCells);
        }
        let first = self
            .cells()
            .find(|&c| self.is_open(c))
            .ok_or(ConfigError::NoOpenCells)?;
        let reached = self.reachable_count(first);
        if reached != open {
            return Err(ConfigError::DisconnectedGrid {
                unreachable: open - reached,
            });
        }
        Ok(())
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells, open or closed.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `cell` lies on the board.
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as u32) < self.rows
            && (cell.col as u32) < self.cols
    }

    /// Row-major index of an in-bounds cell.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.row as usize * self.cols as usize + cell.col as usize)
    }

    /// Status of `cell`; off-board cells are [`CellStatus::Closed`].
    pub fn status(&self, cell: Cell) -> CellStatus {
        self.index_of(cell)
            .map_or(CellStatus::Closed, |i| self.cells[i])
    }

    /// Whether `cell` is on the board and open.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.status(cell) == CellStatus::Open
    }

    /// Whether `cell` is a wall or off the board.
    pub fn is_closed(&self, cell: Cell) -> bool {
        self.status(cell) == CellStatus::Closed
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let cols = self.cols as i32;
        (0..self.rows as i32).flat_map(move |r| (0..cols).map(move |c| Cell::new(r, c)))
    }

    /// All open cells in row-major order.
    pub fn open_cells(&self) -> Vec<Cell> {
        self.cells().filter(|&c| self.is_open(c)).collect()
    }

    /// Number of open cells.
    pub fn open_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&s| s == CellStatus::Open)
            .count()
    }

    /// In-bounds cardinal neighbours of `cell`, open or closed.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        cell.cardinal()
            .into_iter()
            .filter(|&n| self.in_bounds(n))
            .collect()
    }

    /// Open cardinal neighbours of `cell`.
    pub fn open_neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        cell.cardinal()
            .into_iter()
            .filter(|&n| self.is_open(n))
            .collect()
    }

    /// Number of open cardinal neighbours of `cell`.
    pub fn open_neighbour_count(&self, cell: Cell) -> usize {
        cell.cardinal()
            .into_iter()
            .filter(|&n| self.is_open(n))
            .count()
    }

    /// Open cells with exactly one open neighbour, row-major.
    pub fn dead_ends(&self) -> Vec<Cell> {
        self.cells()
            .filter(|&c| self.is_open(c) && self.open_neighbour_count(c) == 1)
            .collect()
    }

    /// Number of open cells reachable from `start` through open neighbours,
    /// including `start` itself. Zero if `start` is closed.
    pub fn reachable_count(&self, start: Cell) -> usize {
        let Some(start_idx) = self.index_of(start).filter(|_| self.is_open(start)) else {
            return 0;
        };
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        visited[start_idx] = true;
        queue.push_back(start);
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            count += 1;
            for n in self.open_neighbours(cell) {
                if let Some(i) = self.index_of(n) {
                    if !visited[i] {
                        visited[i] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        count
    }

    /// Whether all open cells form one 4-connected region.
    pub fn is_connected(&self) -> bool {
        match self.cells().find(|&c| self.is_open(c)) {
            Some(first) => self.reachable_count(first) == self.open_count(),
            None => false,
        }
    }

    /// Encode the board with agents as a row-major feature vector of length
    /// `rows * cols`: `-1` wall, `0` empty open cell, `1` occupied.
    ///
    /// Locations off the board or on walls are ignored.
    pub fn encode_occupancy(&self, locations: &[Cell]) -> Vec<f64> {
        let mut out: Vec<f64> = self.cells.iter().map(|s| s.feature()).collect();
        for &loc in locations {
            if let Some(i) = self.index_of(loc).filter(|_| self.is_open(loc)) {
                out[i] = 1.0;
            }
        }
        out
    }

    /// Render the board as text with agents drawn as `o`.
    pub fn render_with_agents(&self, locations: &[Cell]) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows as usize);
        for r in 0..self.rows as i32 {
            for c in 0..self.cols as i32 {
                let cell = Cell::new(r, c);
                let ch = if locations.contains(&cell) {
                    'o'
                } else if self.is_open(cell) {
                    '.'
                } else {
                    '#'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with_agents(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    // ── Construction ───────────────────────────────────────────

    #[test]
    fn parse_round_trips_through_display() {
        let text = "..#\n#..\n...\n";
        let grid = Grid::parse(text).unwrap();
        assert_eq!(grid.to_string(), text);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        assert!(matches!(
            Grid::parse("...\n..\n..."),
            Err(ConfigError::RaggedGrid {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn parse_rejects_unknown_chars() {
        assert!(matches!(
            Grid::parse("..\n.x"),
            Err(ConfigError::InvalidGridChar { row: 1, col: 1, ch: 'x' })
        ));
    }

    #[test]
    fn all_closed_is_rejected() {
        assert_eq!(Grid::parse("##\n##"), Err(ConfigError::NoOpenCells));
        assert_eq!(Grid::open(0, 4), Err(ConfigError::NoOpenCells));
    }

    #[test]
    fn disconnected_is_rejected() {
        assert_eq!(
            Grid::parse(".#.\n###\n..."),
            Err(ConfigError::DisconnectedGrid { unreachable: 4 })
        );
    }

    #[test]
    fn statuses_length_mismatch_is_rejected() {
        assert!(matches!(
            Grid::from_statuses(2, 2, vec![CellStatus::Open; 3]),
            Err(ConfigError::RaggedGrid { .. })
        ));
    }

    // ── Queries ────────────────────────────────────────────────

    #[test]
    fn out_of_bounds_is_closed() {
        let grid = Grid::open(3, 3).unwrap();
        for cell in [c(-1, 0), c(0, -1), c(3, 0), c(0, 3)] {
            assert!(grid.is_closed(cell));
            assert!(!grid.is_open(cell));
        }
    }

    #[test]
    fn neighbours_at_corner_and_interior() {
        let grid = Grid::open(3, 3).unwrap();
        assert_eq!(grid.neighbours(c(0, 0)).len(), 2);
        assert_eq!(grid.neighbours(c(1, 1)).len(), 4);
        assert_eq!(grid.neighbours(c(0, 1)).len(), 3);
    }

    #[test]
    fn dead_ends_of_corridor() {
        let grid = Grid::parse("....\n####").unwrap();
        assert_eq!(grid.dead_ends(), vec![c(0, 0), c(0, 3)]);
    }

    #[test]
    fn encode_occupancy_marks_walls_and_agents() {
        let grid = Grid::parse(".#\n..").unwrap();
        let v = grid.encode_occupancy(&[c(1, 1), c(0, 1)]);
        assert_eq!(v, vec![0.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn render_draws_agents() {
        let grid = Grid::parse("..\n.#").unwrap();
        assert_eq!(grid.render_with_agents(&[c(0, 1)]), ".o\n.#\n");
    }

    // ── Property tests ─────────────────────────────────────────

    proptest! {
        #[test]
        fn open_xor_closed(
            rows in 1usize..8,
            cols in 1usize..8,
            r in -2i32..10,
            col in -2i32..10,
        ) {
            let grid = Grid::open(rows, cols).unwrap();
            let cell = c(r, col);
            prop_assert!(grid.is_open(cell) ^ grid.is_closed(cell));
            prop_assert_eq!(grid.is_open(cell), grid.in_bounds(cell));
        }

        #[test]
        fn neighbours_symmetric(rows in 1usize..8, cols in 1usize..8, r in 0i32..8, col in 0i32..8) {
            let grid = Grid::open(rows, cols).unwrap();
            let cell = c(r % rows as i32, col % cols as i32);
            for n in grid.neighbours(cell) {
                prop_assert!(grid.neighbours(n).contains(&cell));
            }
        }

        #[test]
        fn encoding_has_one_entry_per_cell(rows in 1usize..8, cols in 1usize..8) {
            let grid = Grid::open(rows, cols).unwrap();
            let v = grid.encode_occupancy(&[c(0, 0)]);
            prop_assert_eq!(v.len(), rows * cols);
            prop_assert_eq!(v.iter().filter(|&&x| x == 1.0).count(), 1);
        }
    }
}
