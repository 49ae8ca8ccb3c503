//! Hand-drawn boards for tests and benches.
//!
//! `.` is open, `#` is a wall. Every board here is a single open region.

use coalesce_core::Cell;
use coalesce_space::Grid;

/// A 5x5 ring of open cells around a solid 3x3 block.
pub const RING: &str = "\
.....
.###.
.###.
.###.
.....";

/// Two rooms joined by a one-cell door.
pub const TWO_ROOMS: &str = "\
...#...
...#...
.......
...#...";

/// A winding corridor with dead ends at both tips.
pub const SNAKE: &str = "\
.....
####.
.....
.####
.....";

/// A small maze-like board with several dead ends and one loop.
pub const MAZELET: &str = "\
..#...
#.#.#.
..#.#.
.##.#.
......
.#.##.";

/// Parse a fixture, panicking on malformed input.
pub fn grid(text: &str) -> Grid {
    match Grid::parse(text) {
        Ok(g) => g,
        Err(e) => panic!("bad fixture: {e}\n{text}"),
    }
}

/// An `n x n` board with no walls.
pub fn open_grid(n: usize) -> Grid {
    match Grid::open(n, n) {
        Ok(g) => g,
        Err(e) => panic!("bad open grid {n}: {e}"),
    }
}

/// Three agents spread over [`TWO_ROOMS`]: one per room corner and one by
/// the door.
pub fn three_clusters() -> (Grid, Vec<Cell>) {
    (
        grid(TWO_ROOMS),
        vec![Cell::new(0, 0), Cell::new(3, 6), Cell::new(2, 3)],
    )
}
