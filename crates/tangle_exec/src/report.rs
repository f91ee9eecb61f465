//! Report surface over repeated runs.
//!
//! Pure data handed to the reporting toolchain: the initial store,
//! every run's final store and emitted order, and the consistency
//! verdict across them. Rendering lives with the consumer.

use serde::{Deserialize, Serialize};
use tangle_core::{InstanceId, Store};

/// Outcome of a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Emitted execution order
    pub order: Vec<InstanceId>,
    /// Store after the run completed
    pub final_state: Store,
}

/// Report over repeated runs of one space from one initial store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Store every run started from
    pub initial: Store,
    /// Per-run outcomes in run order
    pub runs: Vec<RunOutcome>,
}

impl RunReport {
    /// Create an empty report for runs starting from `initial`
    #[must_use]
    pub fn new(initial: Store) -> Self {
        Self {
            initial,
            runs: Vec::new(),
        }
    }

    /// Append a run's outcome
    pub fn push(&mut self, outcome: RunOutcome) {
        self.runs.push(outcome);
    }

    /// Final store of the first run, if any ran
    #[must_use]
    pub fn first_final(&self) -> Option<&Store> {
        self.runs.first().map(|run| &run.final_state)
    }

    /// True iff every run's final store equals the first run's
    ///
    /// Vacuously true with fewer than two runs.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.divergent_runs().is_empty()
    }

    /// Indices of runs whose final store disagrees with the first run's
    #[must_use]
    pub fn divergent_runs(&self) -> Vec<usize> {
        let Some(first) = self.first_final() else {
            return Vec::new();
        };
        self.runs
            .iter()
            .enumerate()
            .filter(|(_, run)| run.final_state != *first)
            .map(|(i, _)| i)
            .collect()
    }
}
