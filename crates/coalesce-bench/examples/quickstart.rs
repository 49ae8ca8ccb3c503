//! End-to-end example: one board, one solve, then a small batch.
//!
//! Run with `RUST_LOG=debug` to see search and cache logs.

use std::sync::Arc;

use coalesce_engine::{TrialConfig, TrialRunner};
use coalesce_maze::MazeGenerator;
use coalesce_search::{CoalescingPathfinder, Heuristic, PairwiseDistanceCache, SearchBudget};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // --- One board, solved by hand ---
    let maze = MazeGenerator::new(6)?.generate_seeded(42)?;
    println!("{}", maze.grid);
    println!(
        "{} open cells, {} dead ends, {} loops carved",
        maze.grid.open_count(),
        maze.dead_ends.len(),
        maze.stats.carves
    );

    let cache = PairwiseDistanceCache::for_grid(&maze.grid, 4, &SearchBudget::unlimited())?;
    let solver = CoalescingPathfinder::new(Heuristic::PairwiseMax(Arc::new(cache)));
    let solution = solver.solve(&maze.grid, &maze.dead_ends, maze.grid.open_cells())?;
    let moves: Vec<String> = solution.moves.iter().map(|m| m.to_string()).collect();
    println!(
        "every agent meets at {} after {} moves: {}",
        solution.meeting_cell,
        solution.total_moves,
        moves.join(" ")
    );

    // --- A batch of seeded trials ---
    let runner = TrialRunner::new(TrialConfig {
        seed: 7,
        ..TrialConfig::default()
    })?;
    let report = runner.run_batch(16)?;
    tracing::info!(
        mean_moves = report.mean_moves,
        max_moves = report.max_moves,
        workers = report.workers,
        "quickstart batch done"
    );
    println!(
        "{} trials: mean {:.2} moves, max {}",
        report.len(),
        report.mean_moves,
        report.max_moves
    );
    Ok(())
}
