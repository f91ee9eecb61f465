//! Determinism harness: repeated seeded runs over one space.
//!
//! Each run starts from a clone of the same initial store and draws
//! its start choices from a seed derived per run, so the whole batch
//! is reproducible while every run walks the graph differently.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use tangle_core::{CoreResult, InstanceId, Store};
use tangle_exec::{ExecRecord, Executor, RunOutcome, RunReport, StartChooser};
use tangle_space::Space;

use crate::seed::Seed;

/// Start chooser drawing uniformly from the unexecuted ids
#[derive(Debug, Clone)]
pub struct RandomChooser {
    rng: ChaCha8Rng,
}

impl RandomChooser {
    /// Create a chooser from a seed
    #[must_use]
    pub fn new(seed: &Seed) -> Self {
        Self { rng: seed.rng() }
    }
}

impl StartChooser for RandomChooser {
    fn pick(&mut self, candidates: &[InstanceId]) -> InstanceId {
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

/// Configuration for the determinism harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// How many runs to perform
    pub runs: usize,
    /// Base seed; each run derives its own stream from it
    pub seed: Seed,
}

impl HarnessConfig {
    /// Create a config with the given seed and the default run count
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self { runs: 10, seed }
    }

    /// Set the run count
    #[must_use]
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(Seed::default())
    }
}

/// Report plus the per-run execution records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessOutput {
    /// Multi-run report surface
    pub report: RunReport,
    /// Full record of each run, severed edges included
    pub records: Vec<ExecRecord>,
}

/// Runs a space repeatedly and collects the report
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    /// Create a harness
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Execute the configured number of runs from `initial`
    ///
    /// # Errors
    ///
    /// Propagates `UndefinedVariable` from any run.
    pub fn run(&self, space: &Space, initial: &Store) -> CoreResult<HarnessOutput> {
        let mut report = RunReport::new(initial.clone());
        let mut records = Vec::with_capacity(self.config.runs);

        for i in 0..self.config.runs {
            let mut store = initial.clone();
            let run_seed = self.config.seed.derive(&format!("run-{}", i));
            let mut chooser = RandomChooser::new(&run_seed);
            let record = Executor::new(space).run(&mut store, &mut chooser)?;
            report.push(RunOutcome {
                order: record.order.clone(),
                final_state: store,
            });
            records.push(record);
        }

        info!(
            runs = records.len(),
            consistent = report.is_consistent(),
            "harness finished"
        );
        Ok(HarnessOutput { report, records })
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}
