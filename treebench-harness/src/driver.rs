//! Benchmark driver.
//!
//! Timing boundaries per scenario kind:
//! - bulk load and full fan-out: the stopwatch is stopped while an empty tree
//!   is created, runs from the first insert through `commit`, and stops again
//!   before the tree is dropped.
//! - steady state: the initial tree is built and committed with the stopwatch
//!   stopped; it then runs without interruption across every edit+commit trial.
//!
//! Any engine error ends the scenario immediately. Nothing is retried and no
//! trial is skipped.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use treebench_core::{
    edit_payload, fanout_pairs, generate, order, random_keys, BenchError, Commitment, EngineError,
    Key, OrderedWorkloads, OrderingMode, Result, RunRng, ScenarioParams, Workload, FULL_FANOUT,
    GENERIC_VALUE_LEN, INITIAL_EDIT_VALUE_LEN,
};

use crate::adapter::{Checkpoint, CommitmentAdapter, EngineKind, TreeAdapter, VersionedAdapter};
use crate::alloc::AllocSnapshot;
use crate::config::HarnessConfig;
use crate::scenario::{InsertStrategy, Scenario, ScenarioKind};

/// Accumulates wall time and allocations while running.
#[derive(Debug, Default)]
pub struct Stopwatch {
    started: Option<(Instant, AllocSnapshot)>,
    elapsed: Duration,
    allocs: AllocSnapshot,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some((Instant::now(), AllocSnapshot::now()));
        }
    }

    pub fn stop(&mut self) {
        if let Some((at, allocs)) = self.started.take() {
            self.elapsed += at.elapsed();
            self.allocs += AllocSnapshot::now() - allocs;
        }
    }

    /// Zeroes the totals; a running stopwatch keeps running from now.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.allocs = AllocSnapshot::default();
        if self.started.is_some() {
            self.started = Some((Instant::now(), AllocSnapshot::now()));
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match &self.started {
            Some((at, _)) => self.elapsed + at.elapsed(),
            None => self.elapsed,
        }
    }

    pub fn allocations(&self) -> AllocSnapshot {
        match &self.started {
            Some((_, allocs)) => {
                let mut total = self.allocs;
                total += AllocSnapshot::now() - *allocs;
                total
            }
            None => self.allocs,
        }
    }
}

/// Per-operation cost of one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct Measurement {
    pub scenario: String,
    pub engine: EngineKind,
    pub params: ScenarioParams,
    pub trials: u32,
    pub elapsed: Duration,
    pub ns_per_op: f64,
    pub allocs_per_op: u64,
    pub bytes_per_op: u64,
    pub commitment: Commitment,
    pub version: Option<u64>,
    pub key_count: usize,
}

impl Measurement {
    fn new(
        scenario: &Scenario,
        trials: u32,
        stopwatch: &Stopwatch,
        checkpoint: Checkpoint,
        key_count: usize,
    ) -> Self {
        let elapsed = stopwatch.elapsed();
        let allocs = stopwatch.allocations();
        let ops = u64::from(trials.max(1));
        Self {
            scenario: scenario.name(),
            engine: scenario.engine,
            params: scenario.params,
            trials,
            elapsed,
            ns_per_op: elapsed.as_nanos() as f64 / ops as f64,
            allocs_per_op: allocs.allocations / ops,
            bytes_per_op: allocs.bytes / ops,
            commitment: checkpoint.commitment,
            version: checkpoint.version,
            key_count,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<48} {:>6} {:>16.0} ns/op {:>12} B/op {:>10} allocs/op",
            self.scenario, self.trials, self.ns_per_op, self.bytes_per_op, self.allocs_per_op
        )
    }
}

fn engine_failure(scenario: &Scenario) -> impl Fn(EngineError) -> BenchError + '_ {
    move |source| BenchError::Engine {
        scenario: scenario.name(),
        params: scenario.params.to_string(),
        source,
    }
}

type InsertOp<A> = fn(&A, &mut <A as TreeAdapter>::Tree, Key, &[u8]) -> std::result::Result<(), EngineError>;

/// Runs trials of a single scenario against one adapter.
#[derive(Clone, Copy, Debug)]
pub struct Driver {
    trials: u32,
    warmup_trials: u32,
}

impl Driver {
    pub fn new(trials: u32, warmup_trials: u32) -> Self {
        Self {
            trials: trials.max(1),
            warmup_trials,
        }
    }

    /// Loads `workload` into a fresh tree per trial and commits it.
    pub fn bulk_load<A: TreeAdapter>(
        &self,
        adapter: &A,
        scenario: &Scenario,
        workload: &Workload,
        strategy: InsertStrategy,
    ) -> Result<Measurement> {
        let op: InsertOp<A> = match strategy {
            InsertStrategy::Insert => A::insert,
            InsertStrategy::InsertOrdered => A::insert_ordered,
        };

        let mut stopwatch = Stopwatch::new();
        for _ in 0..self.warmup_trials {
            Self::load_once(adapter, scenario, workload, op, &mut stopwatch)?;
        }
        stopwatch.reset();

        let mut last = Self::load_once(adapter, scenario, workload, op, &mut stopwatch)?;
        for _ in 1..self.trials {
            last = Self::load_once(adapter, scenario, workload, op, &mut stopwatch)?;
        }
        let (checkpoint, key_count) = last;
        tracing::debug!(
            scenario = %scenario.name(),
            trials = self.trials,
            commitment = %checkpoint.commitment,
            "bulk load finished"
        );

        Ok(Measurement::new(scenario, self.trials, &stopwatch, checkpoint, key_count))
    }

    fn load_once<A: TreeAdapter>(
        adapter: &A,
        scenario: &Scenario,
        workload: &Workload,
        op: InsertOp<A>,
        stopwatch: &mut Stopwatch,
    ) -> Result<(Checkpoint, usize)> {
        let fail = engine_failure(scenario);
        let mut tree = adapter.create_empty();

        stopwatch.start();
        for pair in workload {
            op(adapter, &mut tree, pair.key, &pair.value).map_err(&fail)?;
        }
        let checkpoint = adapter.commit(&mut tree).map_err(&fail)?;
        stopwatch.stop();

        Ok((checkpoint, adapter.key_count(&tree)))
    }

    /// Edits random existing keys of one large tree, committing after every batch.
    pub fn steady_state<A: TreeAdapter>(
        &self,
        adapter: &A,
        scenario: &Scenario,
        rng: &mut RunRng,
    ) -> Result<Measurement> {
        let fail = engine_failure(scenario);
        let size = scenario.params.tree_size;
        let edits = scenario.params.edit_batch_size.ok_or_else(|| {
            BenchError::Config(format!("{} requires an edit batch size", scenario.name()))
        })?;
        if size == 0 {
            return Err(BenchError::Config(format!(
                "{} requires a non-empty tree",
                scenario.name()
            )));
        }

        let keys = random_keys(rng.entropy(), size);
        let initial = [0u8; INITIAL_EDIT_VALUE_LEN];
        let mut tree = adapter.create_empty();
        for key in &keys {
            adapter.insert(&mut tree, *key, &initial).map_err(&fail)?;
        }
        let mut checkpoint = adapter.commit(&mut tree).map_err(&fail)?;
        let before = adapter.key_count(&tree);
        tracing::debug!(scenario = %scenario.name(), keys = before, "steady-state tree built");

        let mut stopwatch = Stopwatch::new();
        stopwatch.start();
        for trial in 0..self.trials {
            let payload = edit_payload(trial);
            for _ in 0..edits {
                let key = keys[rng.picker().gen_range(0..size)];
                adapter.insert(&mut tree, key, &payload).map_err(&fail)?;
            }
            checkpoint = adapter.commit(&mut tree).map_err(&fail)?;
        }
        stopwatch.stop();

        let after = adapter.key_count(&tree);
        if after != before {
            return Err(BenchError::KeyCountChanged {
                scenario: scenario.name(),
                before,
                after,
            });
        }

        Ok(Measurement::new(scenario, self.trials, &stopwatch, checkpoint, after))
    }

    /// Bulk load of keys that differ only in their first byte.
    pub fn full_fanout<A: TreeAdapter>(&self, adapter: &A, scenario: &Scenario) -> Result<Measurement> {
        let width = scenario.params.tree_size;
        if width > FULL_FANOUT {
            return Err(BenchError::Config(format!(
                "{}: fan-out width {} exceeds {}",
                scenario.name(),
                width,
                FULL_FANOUT
            )));
        }
        let workload = order(fanout_pairs(width), OrderingMode::Random);
        self.bulk_load(adapter, scenario, &workload, InsertStrategy::Insert)
    }
}

/// Runs catalog scenarios with run-scoped random sources.
///
/// Bulk-load workloads are generated once per tree size and shared by every
/// scenario of that size, so random and sorted runs see the same pairs.
pub struct Runner {
    driver: Driver,
    rng: RunRng,
    workloads: HashMap<usize, OrderedWorkloads>,
}

impl Runner {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            driver: Driver::new(config.trials, config.warmup_trials),
            rng: RunRng::new(config.seed),
            workloads: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<Measurement> {
        tracing::info!(scenario = %scenario.name(), params = %scenario.params, "scenario started");
        let result = match scenario.engine {
            EngineKind::Commitment => self.run_with(&CommitmentAdapter, scenario),
            EngineKind::Versioned => self.run_with(&VersionedAdapter, scenario),
        };
        match &result {
            Ok(m) => tracing::info!(
                scenario = %m.scenario,
                ns_per_op = m.ns_per_op,
                allocs_per_op = m.allocs_per_op,
                "scenario finished"
            ),
            Err(e) => tracing::error!(scenario = %scenario.name(), error = %e, "scenario aborted"),
        }
        result
    }

    /// Runs scenarios in order, stopping at the first failure.
    pub fn run_all(&mut self, scenarios: &[Scenario]) -> Result<Vec<Measurement>> {
        scenarios.iter().map(|s| self.run(s)).collect()
    }

    fn run_with<A: TreeAdapter>(&mut self, adapter: &A, scenario: &Scenario) -> Result<Measurement> {
        match scenario.kind {
            ScenarioKind::BulkLoad { ordering, strategy } => {
                let size = scenario.params.tree_size;
                let rng = &mut self.rng;
                let workloads = self.workloads.entry(size).or_insert_with(|| {
                    OrderedWorkloads::derive(generate(rng.entropy(), size, GENERIC_VALUE_LEN))
                });
                self.driver
                    .bulk_load(adapter, scenario, workloads.get(ordering), strategy)
            }
            ScenarioKind::SteadyState => self.driver.steady_state(adapter, scenario, &mut self.rng),
            ScenarioKind::FullFanout => self.driver.full_fanout(adapter, scenario),
        }
    }
}
