//! Runs the scenario catalog and prints one line per scenario.
//!
//! Run with: cargo run --release -p treebench-harness -- --help

use std::alloc::System;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use treebench_core::BenchError;
use treebench_harness::{select, EngineKind, HarnessConfig, Runner, StatsAlloc, INSTRUMENTED_SYSTEM};

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

#[derive(Parser, Debug)]
#[command(name = "treebench", about = "Commit cost of authenticated tree engines")]
struct Args {
    /// Only run scenarios whose name contains this string.
    filter: Option<String>,

    /// JSON configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    trials: Option<u32>,

    #[arg(long)]
    warmup: Option<u32>,

    /// Seed for key generation and edit selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Divide all tree and batch sizes by this factor.
    #[arg(long)]
    scale_down: Option<usize>,

    /// Engines to run; repeat for several.
    #[arg(long = "engine", value_enum)]
    engines: Vec<EngineKind>,

    /// Print scenario names without running them.
    #[arg(long)]
    list: bool,

    /// Emit JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(HarnessConfig, bool, bool)> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(warmup) = self.warmup {
            config.warmup_trials = warmup;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(scale) = self.scale_down {
            config.scale_down = scale;
        }
        if !self.engines.is_empty() {
            config.engines = self.engines;
        }
        if self.filter.is_some() {
            config.filter = self.filter;
        }
        config.validate()?;
        Ok((config, self.list, self.json))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("treebench=info,treebench_harness=info,treebench_core=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let (config, list, json) = Args::parse().into_config()?;

    let scenarios = select(&config.engines, config.filter.as_deref(), config.scale_down);
    if scenarios.is_empty() {
        return Err(BenchError::NoScenario(config.filter.unwrap_or_default()).into());
    }

    if list {
        for scenario in &scenarios {
            println!("{}", scenario.name());
        }
        return Ok(());
    }

    let mut runner = Runner::new(&config);
    tracing::info!(seed = runner.seed(), scenarios = scenarios.len(), "run started");

    for scenario in &scenarios {
        let measurement = runner.run(scenario)?;
        if json {
            println!("{}", serde_json::to_string(&measurement)?);
        } else {
            println!("{}", measurement);
        }
    }
    Ok(())
}
