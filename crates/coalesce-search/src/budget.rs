//! Cooperative cancellation and resource limits for searches.
//!
//! The reachable state space grows combinatorially with the number of
//! agents, so every search and cache build runs under a [`SearchBudget`].
//! Budgets are polled between node expansions; there are no suspension
//! points inside a search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use coalesce_core::SearchError;

/// How many expansions pass between deadline clock reads.
const DEADLINE_POLL_INTERVAL: u64 = 64;

/// A shared cancellation flag.
///
/// Clones observe the same flag, so a token handed to a search (or to all
/// cache workers) can be tripped from any thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Limits applied to a single search (or to each two-agent search inside a
/// cache build).
///
/// The default budget is unlimited.
#[derive(Clone, Debug, Default)]
pub struct SearchBudget {
    /// Abort with [`SearchError::Cancelled`] once tripped.
    pub cancel: Option<CancelToken>,
    /// Abort with [`SearchError::DeadlineExceeded`] after this instant.
    pub deadline: Option<Instant>,
    /// Abort with [`SearchError::ExpansionLimit`] after this many node
    /// expansions.
    pub max_expansions: Option<u64>,
}

impl SearchBudget {
    /// A budget with no limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Abort after `limit` node expansions.
    pub fn with_max_expansions(mut self, limit: u64) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    /// Whether the cancellation token (if any) has been tripped.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Poll the budget before the next expansion.
    ///
    /// `expanded` is the number of expansions so far; `started` is when the
    /// search began, used for the elapsed time in the error.
    pub(crate) fn check(&self, expanded: u64, started: Instant) -> Result<(), SearchError> {
        if self.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if let Some(limit) = self.max_expansions {
            if expanded >= limit {
                return Err(SearchError::ExpansionLimit { limit });
            }
        }
        if let Some(deadline) = self.deadline {
            if expanded % DEADLINE_POLL_INTERVAL == 0 {
                let now = Instant::now();
                if now >= deadline {
                    return Err(SearchError::DeadlineExceeded {
                        elapsed_ms: now.duration_since(started).as_millis() as u64,
                    });
                }
            }
        }
        Ok(())
    }
}
