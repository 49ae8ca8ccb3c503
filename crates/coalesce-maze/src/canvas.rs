//! Mutable working board used while a maze is being carved.

use coalesce_core::{Cell, ConfigError};
use coalesce_space::{CellStatus, Grid};
use smallvec::SmallVec;

/// A square board of open flags. Starts fully closed and is frozen into a
/// [`Grid`] once generation finishes.
pub(crate) struct Canvas {
    size: i32,
    open: Vec<bool>,
}

impl Canvas {
    pub fn closed(size: u32) -> Self {
        let n = size as usize;
        Self {
            size: size as i32,
            open: vec![false; n * n],
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let in_bounds =
            cell.row >= 0 && cell.col >= 0 && cell.row < self.size && cell.col < self.size;
        in_bounds.then(|| cell.row as usize * self.size as usize + cell.col as usize)
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.open[i])
    }

    /// In-bounds and closed.
    pub fn is_closed(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| !self.open[i])
    }

    pub fn set_open(&mut self, cell: Cell, open: bool) {
        if let Some(i) = self.index(cell) {
            self.open[i] = open;
        }
    }

    /// In-bounds cardinal neighbours.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        cell.cardinal()
            .into_iter()
            .filter(|&n| self.index(n).is_some())
            .collect()
    }

    pub fn open_neighbour_count(&self, cell: Cell) -> usize {
        cell.cardinal()
            .into_iter()
            .filter(|&n| self.is_open(n))
            .count()
    }

    pub fn open_count(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }

    pub fn freeze(self) -> Result<Grid, ConfigError> {
        let n = self.size as usize;
        let cells = self
            .open
            .into_iter()
            .map(|o| if o { CellStatus::Open } else { CellStatus::Closed })
            .collect();
        Grid::from_statuses(n, n, cells)
    }
}
