//! Per-search and per-cache-build performance counters.
//!
//! All durations are in microseconds.

/// Counters collected during one [`solve`](crate::CoalescingPathfinder::solve).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchMetrics {
    /// States popped and expanded (goal pop excluded).
    pub expanded: u64,
    /// Entries pushed onto the priority queue, root included.
    pub pushed: u64,
    /// Popped entries skipped because a cheaper path was already recorded.
    pub stale_skips: u64,
    /// Largest queue length observed.
    pub peak_queue: usize,
    /// Wall-clock time for the whole search, in microseconds.
    pub elapsed_us: u64,
}

impl SearchMetrics {
    /// Fold another search's counters into this one. Peak queue takes the
    /// maximum; everything else adds.
    pub fn absorb(&mut self, other: &SearchMetrics) {
        self.expanded += other.expanded;
        self.pushed += other.pushed;
        self.stale_skips += other.stale_skips;
        self.peak_queue = self.peak_queue.max(other.peak_queue);
        self.elapsed_us += other.elapsed_us;
    }
}

/// Counters collected while building a
/// [`PairwiseDistanceCache`](crate::PairwiseDistanceCache).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Unordered pairs solved and stored.
    pub pairs: usize,
    /// Worker threads used (1 for a sequential build).
    pub workers: usize,
    /// Two-agent searches' expansions, summed.
    pub expanded: u64,
    /// Wall-clock build time, in microseconds.
    pub elapsed_us: u64,
}
