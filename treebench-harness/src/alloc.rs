//! Allocation accounting.
//!
//! Counts are read from [`INSTRUMENTED_SYSTEM`], which only moves once it is
//! installed as the global allocator of the final binary:
//!
//! ```ignore
//! use std::alloc::System;
//! use treebench_harness::{StatsAlloc, INSTRUMENTED_SYSTEM};
//!
//! #[global_allocator]
//! static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;
//! ```
//!
//! Without it every snapshot reads zero.

use std::ops::{AddAssign, Sub};

use serde::{Deserialize, Serialize};
use stats_alloc::Stats;

pub use stats_alloc::{StatsAlloc, INSTRUMENTED_SYSTEM};

/// Cumulative allocation counters at one instant, or the difference of two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocSnapshot {
    pub allocations: u64,
    pub bytes: u64,
}

impl AllocSnapshot {
    pub fn now() -> Self {
        Self::from(INSTRUMENTED_SYSTEM.stats())
    }
}

/// A `realloc` counts as one allocation; only its growth counts as bytes.
impl From<Stats> for AllocSnapshot {
    fn from(stats: Stats) -> Self {
        Self {
            allocations: (stats.allocations + stats.reallocations) as u64,
            bytes: stats.bytes_allocated as u64,
        }
    }
}

impl Sub for AllocSnapshot {
    type Output = AllocSnapshot;

    fn sub(self, rhs: Self) -> Self {
        Self {
            allocations: self.allocations.saturating_sub(rhs.allocations),
            bytes: self.bytes.saturating_sub(rhs.bytes),
        }
    }
}

impl AddAssign for AllocSnapshot {
    fn add_assign(&mut self, rhs: Self) {
        self.allocations += rhs.allocations;
        self.bytes += rhs.bytes;
    }
}
