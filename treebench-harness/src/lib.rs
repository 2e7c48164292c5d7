//! Workload and measurement harness for authenticated tree engines.
//!
//! [`Runner`] walks the scenario catalog, feeding generated workloads through a
//! [`TreeAdapter`] and timing the commit path with a [`Stopwatch`].

pub mod adapter;
pub mod alloc;
pub mod config;
pub mod driver;
pub mod scenario;

pub use adapter::{Checkpoint, CommitmentAdapter, EngineKind, TreeAdapter, VersionedAdapter};
pub use alloc::{AllocSnapshot, StatsAlloc, INSTRUMENTED_SYSTEM};
pub use config::HarnessConfig;
pub use driver::{Driver, Measurement, Runner, Stopwatch};
pub use scenario::{catalog, catalog_for, select, InsertStrategy, Scenario, ScenarioKind};
