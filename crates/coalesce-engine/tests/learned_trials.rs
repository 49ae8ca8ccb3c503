//! Trials driven by a caller-supplied estimator.

use std::sync::Arc;

use coalesce_engine::{HeuristicChoice, Occupancy, TrialConfig, TrialRunner};
use coalesce_search::FnEstimator;

const SIZE: u32 = 6;

fn config(heuristic: HeuristicChoice) -> TrialConfig {
    TrialConfig {
        board_size: SIZE,
        seed: 2024,
        occupancy: Occupancy::Fraction(0.45),
        heuristic,
        cache_workers: Some(2),
        ..TrialConfig::default()
    }
}

#[test]
fn learned_plans_are_valid_and_never_beat_optimal() {
    // Occupied cells minus one: a crude stand-in for a trained model.
    let crowd = FnEstimator::new((SIZE * SIZE) as usize, |f: &[f64]| {
        Ok(f.iter().filter(|&&x| x > 0.5).count() as f64 - 1.0)
    });
    let learned = TrialRunner::new(config(HeuristicChoice::Learned))
        .unwrap()
        .with_estimator(Arc::new(crowd));
    let optimal = TrialRunner::new(config(HeuristicChoice::PairwiseMax)).unwrap();

    for index in 0..5 {
        let l = learned.run(index).unwrap();
        let o = optimal.run(index).unwrap();
        assert_eq!(l.seed, o.seed);
        assert_eq!(l.agents, o.agents);
        assert!(l.total_moves >= o.total_moves);
        assert!(l.cache.is_none());
    }
}

#[test]
fn deadline_in_the_past_aborts_cache_build() {
    let runner = TrialRunner::new(TrialConfig {
        deadline: Some(std::time::Duration::ZERO),
        ..config(HeuristicChoice::PairwiseMax)
    })
    .unwrap();
    let err = runner.run(0).unwrap_err();
    assert!(err.to_string().contains("deadline"));
}
