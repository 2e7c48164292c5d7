//! Scenario catalog.

use serde::{Deserialize, Serialize};
use treebench_core::{OrderingMode, ScenarioParams, FULL_FANOUT};

use crate::adapter::EngineKind;

/// Bulk-load tree sizes.
pub const LEAF_COUNTS: [usize; 2] = [1_000, 10_000];

/// Tree size of the steady-state edit scenario.
pub const MODIFY_TREE_SIZE: usize = 200_000;

/// Keys edited per steady-state iteration.
pub const MODIFY_EDIT_BATCH: usize = 10_000;

/// Which insert operation a bulk load goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertStrategy {
    Insert,
    InsertOrdered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Fresh tree per trial; inserts plus commit are timed.
    BulkLoad {
        ordering: OrderingMode,
        strategy: InsertStrategy,
    },
    /// One prebuilt tree; repeated edit batches plus commit are timed.
    SteadyState,
    /// Keys spread over every child of the root.
    FullFanout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub engine: EngineKind,
    pub kind: ScenarioKind,
    pub params: ScenarioParams,
}

impl Scenario {
    /// Case name without the engine prefix, e.g. `insertOrdered/leaves/1000`.
    pub fn case_name(&self) -> String {
        let p = &self.params;
        match self.kind {
            ScenarioKind::BulkLoad { strategy, .. } => {
                let op = match strategy {
                    InsertStrategy::Insert => "insert",
                    InsertStrategy::InsertOrdered => "insertOrdered",
                };
                format!("{}/leaves/{}", op, p.tree_size)
            }
            ScenarioKind::SteadyState => format!(
                "modify/leaves/{}/edit/{}",
                p.tree_size,
                p.edit_batch_size.unwrap_or(0)
            ),
            ScenarioKind::FullFanout => format!("fullnode/{}", p.tree_size),
        }
    }

    /// Full name, e.g. `commitment/insert/leaves/1000`.
    pub fn name(&self) -> String {
        format!("{}/{}", self.engine, self.case_name())
    }

    pub fn scaled_down(mut self, factor: usize) -> Self {
        self.params = self.params.scaled_down(factor);
        self
    }
}

/// All scenarios for one engine.
pub fn catalog_for(engine: EngineKind) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    for size in LEAF_COUNTS {
        scenarios.push(Scenario {
            engine,
            kind: ScenarioKind::BulkLoad {
                ordering: OrderingMode::Random,
                strategy: InsertStrategy::Insert,
            },
            params: ScenarioParams::tree(size),
        });
        scenarios.push(Scenario {
            engine,
            kind: ScenarioKind::BulkLoad {
                ordering: OrderingMode::SortedByKey,
                strategy: InsertStrategy::InsertOrdered,
            },
            params: ScenarioParams::tree(size),
        });
    }

    scenarios.push(Scenario {
        engine,
        kind: ScenarioKind::SteadyState,
        params: ScenarioParams::with_edits(MODIFY_TREE_SIZE, MODIFY_EDIT_BATCH),
    });

    scenarios.push(Scenario {
        engine,
        kind: ScenarioKind::FullFanout,
        params: ScenarioParams::tree(FULL_FANOUT),
    });

    scenarios
}

/// Every scenario for every engine.
pub fn catalog() -> Vec<Scenario> {
    EngineKind::ALL.into_iter().flat_map(catalog_for).collect()
}

/// Scenarios for `engines` whose full name contains `filter`, scaled down by `scale_down`.
pub fn select(engines: &[EngineKind], filter: Option<&str>, scale_down: usize) -> Vec<Scenario> {
    engines
        .iter()
        .flat_map(|engine| catalog_for(*engine))
        .map(|s| s.scaled_down(scale_down))
        .filter(|s| filter.map_or(true, |f| s.name().contains(f)))
        .collect()
}
