//! Dead-end cell sets.

use std::collections::BTreeSet;

use coalesce_core::Cell;

use crate::grid::Grid;

/// Open cells with exactly one open cardinal neighbour.
///
/// Kept sorted so iteration and intersections are deterministic. A set is
/// measured once, right after a board is generated, and never updated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeadEndSet {
    cells: BTreeSet<Cell>,
}

impl DeadEndSet {
    /// Scan `grid` for every dead end.
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            cells: grid.dead_ends().into_iter().collect(),
        }
    }

    /// Whether `cell` is in the set.
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of dead ends.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Dead ends in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// The members of `locations` that are dead ends, sorted.
    pub fn intersect(&self, locations: &[Cell]) -> Vec<Cell> {
        let mut out: Vec<Cell> = locations
            .iter()
            .copied()
            .filter(|c| self.cells.contains(c))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl FromIterator<Cell> for DeadEndSet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_both_tips_of_an_l() {
        let grid = Grid::parse("..\n.#").unwrap();
        let set = DeadEndSet::from_grid(&grid);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Cell::new(0, 1)));
        assert!(set.contains(Cell::new(1, 0)));
        assert!(!set.contains(Cell::new(0, 0)));
    }

    #[test]
    fn open_square_has_none() {
        let grid = Grid::open(3, 3).unwrap();
        assert!(DeadEndSet::from_grid(&grid).is_empty());
    }

    #[test]
    fn intersect_keeps_only_members() {
        let set: DeadEndSet = [Cell::new(0, 0), Cell::new(2, 2)].into_iter().collect();
        let hits = set.intersect(&[Cell::new(2, 2), Cell::new(1, 1), Cell::new(2, 2)]);
        assert_eq!(hits, vec![Cell::new(2, 2)]);
    }
}
