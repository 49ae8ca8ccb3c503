//! Agent placement on a generated board.

use coalesce_core::Cell;
use rand::Rng;

use crate::config::Occupancy;

/// Place agents on `open` cells according to `occupancy`.
///
/// The result is sorted and deduplicated. For [`Occupancy::Fraction`] the
/// draws are with replacement, so the result usually holds fewer than
/// `floor(p * open.len())` cells. Returns an empty vector only when `open`
/// is empty.
pub fn sample_agents<R: Rng + ?Sized>(
    open: &[Cell],
    occupancy: Occupancy,
    rng: &mut R,
) -> Vec<Cell> {
    if open.is_empty() {
        return Vec::new();
    }
    let mut agents: Vec<Cell> = match occupancy {
        Occupancy::All => open.to_vec(),
        Occupancy::Fraction(p) => {
            let draws = ((p * open.len() as f64).floor() as usize).max(1);
            (0..draws)
                .map(|_| open[rng.random_range(0..open.len())])
                .collect()
        }
    };
    agents.sort_unstable();
    agents.dedup();
    agents
}
