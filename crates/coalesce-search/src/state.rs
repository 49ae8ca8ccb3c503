//! Search nodes: canonical agent-location sets and their transitions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use coalesce_core::{Cell, ConfigError, Move};
use coalesce_space::{DeadEndSet, Grid};

/// A canonical, order-independent set of agent locations.
///
/// Stored sorted (row-major) and deduplicated, so structural equality and
/// hashing of the backing slice are set equality and set hashing. Clones
/// share the allocation; the search keeps one copy per map entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationSet(Arc<[Cell]>);

impl LocationSet {
    /// Canonicalize arbitrary cells: sort and drop duplicates.
    pub fn new<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let mut cells: Vec<Cell> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        Self(cells.into())
    }

    /// Number of distinct locations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no locations at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every agent shares one cell.
    pub fn is_coalesced(&self) -> bool {
        self.0.len() == 1
    }

    /// Whether `cell` is occupied.
    pub fn contains(&self, cell: Cell) -> bool {
        self.0.binary_search(&cell).is_ok()
    }

    /// Locations in row-major order.
    pub fn as_slice(&self) -> &[Cell] {
        &self.0
    }

    /// Every unordered pair of distinct locations.
    pub fn pairs(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        self.0
            .iter()
            .enumerate()
            .flat_map(move |(i, &a)| self.0[i + 1..].iter().map(move |&b| (a, b)))
    }

    /// Shift every location by `mv` on `grid`. Agents whose destination is
    /// closed stay put; coinciding destinations merge.
    pub fn shifted(&self, grid: &Grid, mv: Move) -> Self {
        Self::new(self.0.iter().map(|&loc| {
            let next = loc.shifted(mv);
            if grid.is_open(next) {
                next
            } else {
                loc
            }
        }))
    }
}

impl fmt::Debug for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

/// A node in the coalescing search graph.
///
/// Identity is the location set alone: two states reached by different
/// moves (and therefore with different `move_taken`) compare and hash
/// equal when their agents occupy the same cells.
#[derive(Clone)]
pub struct SearchState<'g> {
    grid: &'g Grid,
    dead_ends: &'g DeadEndSet,
    locations: LocationSet,
    move_taken: Option<Move>,
    active_dead_ends: Vec<Cell>,
}

impl<'g> SearchState<'g> {
    /// Build a root state (no move taken).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyStart`] for no locations and
    /// [`ConfigError::StartCellClosed`] for a location on a wall or off
    /// the board.
    pub fn root<I: IntoIterator<Item = Cell>>(
        grid: &'g Grid,
        dead_ends: &'g DeadEndSet,
        locations: I,
    ) -> Result<Self, ConfigError> {
        let locations = LocationSet::new(locations);
        if locations.is_empty() {
            return Err(ConfigError::EmptyStart);
        }
        if let Some(&cell) = locations.as_slice().iter().find(|&&c| !grid.is_open(c)) {
            return Err(ConfigError::StartCellClosed { cell });
        }
        Ok(Self::from_parts(grid, dead_ends, locations, None))
    }

    /// Build a state from an already validated location set.
    pub(crate) fn from_parts(
        grid: &'g Grid,
        dead_ends: &'g DeadEndSet,
        locations: LocationSet,
        move_taken: Option<Move>,
    ) -> Self {
        let active_dead_ends = dead_ends.intersect(locations.as_slice());
        Self {
            grid,
            dead_ends,
            locations,
            move_taken,
            active_dead_ends,
        }
    }

    /// The state after every agent attempts `mv`.
    ///
    /// Pure: `self` is untouched. The child's active dead ends are
    /// recomputed from the board's full dead-end set.
    pub fn apply(&self, mv: Move) -> Self {
        let locations = self.locations.shifted(self.grid, mv);
        Self::from_parts(self.grid, self.dead_ends, locations, Some(mv))
    }

    /// Apply `moves` in order.
    pub fn replay<I: IntoIterator<Item = Move>>(&self, moves: I) -> Self {
        moves
            .into_iter()
            .fold(self.clone(), |state, mv| state.apply(mv))
    }

    /// Goal test: a single location remains.
    pub fn is_goal(&self) -> bool {
        self.locations.is_coalesced()
    }

    /// The canonical identity key.
    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    /// The move that produced this state; `None` for a root.
    pub fn move_taken(&self) -> Option<Move> {
        self.move_taken
    }

    /// Occupied dead ends, sorted.
    pub fn active_dead_ends(&self) -> &[Cell] {
        &self.active_dead_ends
    }

    /// The board.
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// The board's dead ends as measured after generation.
    pub fn dead_ends(&self) -> &'g DeadEndSet {
        self.dead_ends
    }
}

impl PartialEq for SearchState<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.locations == other.locations
    }
}

impl Eq for SearchState<'_> {}

impl Hash for SearchState<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locations.hash(state);
    }
}

impl fmt::Debug for SearchState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchState")
            .field("locations", &self.locations)
            .field("move_taken", &self.move_taken)
            .field("active_dead_ends", &self.active_dead_ends)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    #[test]
    fn location_set_is_canonical() {
        let a = LocationSet::new([c(1, 1), c(0, 0), c(1, 1)]);
        let b = LocationSet::new([c(0, 0), c(1, 1)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.as_slice(), &[c(0, 0), c(1, 1)]);
    }

    #[test]
    fn pairs_enumerates_each_once() {
        let set = LocationSet::new([c(0, 0), c(0, 1), c(0, 2)]);
        let pairs: Vec<_> = set.pairs().collect();
        assert_eq!(
            pairs,
            vec![(c(0, 0), c(0, 1)), (c(0, 0), c(0, 2)), (c(0, 1), c(0, 2))]
        );
    }

    #[test]
    fn root_rejects_bad_starts() {
        let grid = Grid::parse("..\n.#").unwrap();
        let none = DeadEndSet::default();
        assert!(matches!(
            SearchState::root(&grid, &none, []),
            Err(ConfigError::EmptyStart)
        ));
        assert!(matches!(
            SearchState::root(&grid, &none, [c(1, 1)]),
            Err(ConfigError::StartCellClosed { cell }) if cell == c(1, 1)
        ));
        assert!(matches!(
            SearchState::root(&grid, &none, [c(5, 5)]),
            Err(ConfigError::StartCellClosed { .. })
        ));
    }

    #[test]
    fn walls_block_and_agents_merge() {
        // .#.
        // ...
        let grid = Grid::parse(".#.\n...").unwrap();
        let none = DeadEndSet::default();
        let root = SearchState::root(&grid, &none, [c(0, 0), c(1, 0), c(0, 2)]).unwrap();

        let right = root.apply(Move::Right);
        // (0,0) hits the wall, (1,0) slides, (0,2) hits the border.
        assert_eq!(right.locations().as_slice(), &[c(0, 0), c(0, 2), c(1, 1)]);

        let up = root.apply(Move::Up);
        // (1,0) moves onto the stationary agent at (0,0).
        assert_eq!(up.locations().as_slice(), &[c(0, 0), c(0, 2)]);
        assert_eq!(up.move_taken(), Some(Move::Up));
        assert_eq!(root.move_taken(), None);
    }

    #[test]
    fn identity_ignores_move_and_dead_ends() {
        let grid = Grid::open(3, 3).unwrap();
        let none = DeadEndSet::default();
        let root = SearchState::root(&grid, &none, [c(1, 1)]).unwrap();
        let via_left = root.apply(Move::Left).apply(Move::Right);
        let via_up = root.apply(Move::Up).apply(Move::Down);
        assert_eq!(via_left, via_up);
        assert_ne!(via_left.move_taken(), via_up.move_taken());

        let mut seen = HashSet::new();
        seen.insert(via_left);
        assert!(seen.contains(&via_up));
    }

    #[test]
    fn active_dead_ends_follow_the_agents() {
        // ...
        // #.#
        let grid = Grid::parse("...\n#.#").unwrap();
        let dead_ends = DeadEndSet::from_grid(&grid);
        assert_eq!(dead_ends.len(), 3);

        let root = SearchState::root(&grid, &dead_ends, [c(0, 1)]).unwrap();
        assert!(root.active_dead_ends().is_empty());
        let down = root.apply(Move::Down);
        assert_eq!(down.active_dead_ends(), &[c(1, 1)]);
        // Recomputed from the full set, not accumulated.
        let back = down.apply(Move::Up).apply(Move::Left);
        assert_eq!(back.active_dead_ends(), &[c(0, 0)]);
    }

    #[test]
    fn apply_is_deterministic() {
        let grid = Grid::parse("...\n.#.\n...").unwrap();
        let none = DeadEndSet::default();
        let root = SearchState::root(&grid, &none, grid.open_cells()).unwrap();
        for mv in Move::ALL {
            let a = root.apply(mv);
            let b = root.apply(mv);
            assert_eq!(a, b);
            assert_eq!(a.active_dead_ends(), b.active_dead_ends());
        }
    }

    #[test]
    fn replay_folds_moves() {
        let grid = Grid::open(3, 3).unwrap();
        let none = DeadEndSet::default();
        let root = SearchState::root(&grid, &none, [c(0, 0), c(2, 2)]).unwrap();
        let end = root.replay([Move::Down, Move::Down, Move::Right, Move::Right]);
        assert!(end.is_goal());
        assert_eq!(end.locations().as_slice(), &[c(2, 2)]);
    }
}
