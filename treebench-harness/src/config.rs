//! Harness configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use treebench_core::{BenchError, Result};

use crate::adapter::EngineKind;

/// Settings for one benchmark run, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Measured trials per scenario.
    pub trials: u32,
    /// Discarded trials run before a bulk-load or fan-out measurement.
    pub warmup_trials: u32,
    /// Run seed; drawn from the OS and logged when absent.
    pub seed: Option<u64>,
    /// Divisor applied to every tree and batch size.
    pub scale_down: usize,
    pub engines: Vec<EngineKind>,
    /// Substring a scenario name must contain to run.
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            warmup_trials: 1,
            seed: None,
            scale_down: 1,
            engines: EngineKind::ALL.to_vec(),
            filter: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BenchError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(BenchError::Config("trials must be at least 1".into()));
        }
        if self.scale_down == 0 {
            return Err(BenchError::Config("scale_down must be at least 1".into()));
        }
        if self.engines.is_empty() {
            return Err(BenchError::Config("at least one engine is required".into()));
        }
        Ok(())
    }
}
